use crate::{consensus, tree::preorder, Moment, Node};

/// Every node of the tree rooted at `node` that reached consensus, in pre-order
pub fn collect<N: Node + ?Sized>(node: &N) -> Vec<Moment> {
    let mut moments = Vec::new();
    if consensus::evaluate(node.votes()) {
        moments.push(node.moment());
    }
    for c in preorder(node.comments()) {
        if consensus::evaluate(&c.votes) {
            moments.push(c.moment());
        }
    }
    moments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_util::{comment, post, vote},
        MomentKind,
    };

    fn agreed(first_id: u64) -> Vec<crate::api::Vote> {
        vec![vote(first_id, true), vote(first_id + 1, true)]
    }

    #[test]
    fn nothing_agreed_collects_nothing() {
        let p = post(0, vec![vote(0, true)], vec![comment(0, vec![], vec![])]);
        assert!(collect(&p).is_empty());
    }

    #[test]
    fn skips_nodes_without_consensus() {
        let p = post(
            0,
            agreed(0),
            vec![comment(0, agreed(2), vec![comment(1, vec![vote(4, false)], vec![])])],
        );
        let moments = collect(&p);
        assert_eq!(
            moments,
            vec![
                Moment {
                    id: 0,
                    label: String::from("post 0"),
                    kind: MomentKind::Post,
                },
                Moment {
                    id: 0,
                    label: String::from("comment 0"),
                    kind: MomentKind::Comment,
                },
            ]
        );
    }

    #[test]
    fn visits_in_pre_order() {
        // 0 -> (1 -> (2, 3), 4 -> 5)
        let p = post(
            7,
            agreed(0),
            vec![
                comment(
                    1,
                    agreed(10),
                    vec![comment(2, agreed(20), vec![]), comment(3, agreed(30), vec![])],
                ),
                comment(4, agreed(40), vec![comment(5, agreed(50), vec![])]),
            ],
        );
        let ids = collect(&p).into_iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![7, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn can_start_from_a_comment() {
        let c = comment(3, vec![], vec![comment(4, agreed(0), vec![])]);
        let moments = collect(&c);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].label, "comment 4");
    }
}
