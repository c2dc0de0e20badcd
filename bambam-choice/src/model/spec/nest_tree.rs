use super::{NestChildConfig, NestConfig};
use crate::model::{expression::CompileError, AlternativeId};
use std::collections::{HashMap, HashSet};

/// a member of a nest, referring to an alternative by its position in the
/// model specification or to another nest by its index in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NestChild {
    Alternative(usize),
    Nest(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Nest {
    pub name: String,
    /// scale parameter, within (0, 1]
    pub theta: f64,
    pub children: Vec<NestChild>,
}

/// the nesting structure of a choice model, stored as a flat arena of nests.
/// the root is always at index [`NestTree::ROOT`]. children are stored after
/// their parents, so iterating in reverse visits every nest after all of its
/// child nests.
#[derive(Clone, Debug, PartialEq)]
pub struct NestTree {
    nests: Vec<Nest>,
}

impl NestTree {
    pub const ROOT: usize = 0;

    /// a single root nest with θ = 1 holding every alternative, which reduces
    /// to a flat multinomial logit model.
    pub fn flat(alternative_count: usize) -> NestTree {
        NestTree {
            nests: vec![Nest {
                name: String::from("root"),
                theta: 1.0,
                children: (0..alternative_count).map(NestChild::Alternative).collect(),
            }],
        }
    }

    /// builds a tree from configuration. `positions` maps each alternative id
    /// to its position in the model. every alternative must be placed in
    /// exactly one nest.
    pub fn from_config(
        config: &NestConfig,
        positions: &HashMap<AlternativeId, usize>,
    ) -> Result<NestTree, CompileError> {
        let mut builder = TreeBuilder {
            nests: vec![],
            names: HashSet::new(),
            placed: HashSet::new(),
            positions,
        };
        builder.add(config)?;
        let mut missing: Vec<AlternativeId> = positions
            .iter()
            .filter(|(_, position)| !builder.placed.contains(*position))
            .map(|(id, _)| *id)
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            return Err(CompileError::InvalidModelSpec(format!(
                "alternatives {missing:?} are not placed in any nest"
            )));
        }
        Ok(NestTree {
            nests: builder.nests,
        })
    }

    /// true if the tree is a single nest with θ = 1
    pub fn is_flat(&self) -> bool {
        match self.nests.as_slice() {
            [root] => root.theta == 1.0,
            _ => false,
        }
    }

    pub fn root(&self) -> &Nest {
        &self.nests[NestTree::ROOT]
    }

    pub fn nest(&self, index: usize) -> Option<&Nest> {
        self.nests.get(index)
    }

    pub fn nests(&self) -> &[Nest] {
        &self.nests
    }

    pub fn len(&self) -> usize {
        self.nests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nests.is_empty()
    }
}

struct TreeBuilder<'a> {
    nests: Vec<Nest>,
    names: HashSet<String>,
    placed: HashSet<usize>,
    positions: &'a HashMap<AlternativeId, usize>,
}

impl TreeBuilder<'_> {
    fn add(&mut self, config: &NestConfig) -> Result<usize, CompileError> {
        let theta = config.theta;
        if !(theta > 0.0 && theta <= 1.0) {
            return Err(CompileError::InvalidNestParameter {
                nest: config.name.clone(),
                theta,
            });
        }
        if !self.names.insert(config.name.clone()) {
            return Err(CompileError::InvalidModelSpec(format!(
                "nest name '{}' is used more than once",
                config.name
            )));
        }
        if config.children.is_empty() {
            return Err(CompileError::InvalidModelSpec(format!(
                "nest '{}' has no children",
                config.name
            )));
        }
        let index = self.nests.len();
        self.nests.push(Nest {
            name: config.name.clone(),
            theta,
            children: vec![],
        });
        let mut children = Vec::with_capacity(config.children.len());
        for child in config.children.iter() {
            let resolved = match child {
                NestChildConfig::Alternative(id) => {
                    let position = *self.positions.get(id).ok_or_else(|| {
                        CompileError::InvalidModelSpec(format!(
                            "nest '{}' refers to unknown alternative {id}",
                            config.name
                        ))
                    })?;
                    if !self.placed.insert(position) {
                        return Err(CompileError::InvalidModelSpec(format!(
                            "alternative {id} is placed in more than one nest"
                        )));
                    }
                    NestChild::Alternative(position)
                }
                NestChildConfig::Nest(nest) => NestChild::Nest(self.add(nest)?),
            };
            children.push(resolved);
        }
        self.nests[index].children = children;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> HashMap<AlternativeId, usize> {
        HashMap::from([(10, 0), (20, 1), (30, 2)])
    }

    fn nest(name: &str, theta: f64, children: Vec<NestChildConfig>) -> NestConfig {
        NestConfig {
            name: name.to_string(),
            theta,
            children,
        }
    }

    #[test]
    fn test_two_level_tree() {
        let config = nest(
            "root",
            1.0,
            vec![
                NestChildConfig::Alternative(10),
                NestChildConfig::Nest(nest(
                    "transit",
                    0.5,
                    vec![NestChildConfig::Alternative(20), NestChildConfig::Alternative(30)],
                )),
            ],
        );
        let tree = NestTree::from_config(&config, &positions()).expect("test invariant failed");
        assert_eq!(tree.len(), 2);
        assert!(!tree.is_flat());
        assert_eq!(
            tree.root().children,
            vec![NestChild::Alternative(0), NestChild::Nest(1)]
        );
        let transit = tree.nest(1).expect("test invariant failed");
        assert_eq!(transit.theta, 0.5);
        assert_eq!(
            transit.children,
            vec![NestChild::Alternative(1), NestChild::Alternative(2)]
        );
    }

    #[test]
    fn test_theta_bounds() {
        for theta in [0.0, -0.5, 1.5, f64::NAN] {
            let config = nest(
                "root",
                theta,
                vec![
                    NestChildConfig::Alternative(10),
                    NestChildConfig::Alternative(20),
                    NestChildConfig::Alternative(30),
                ],
            );
            let result = NestTree::from_config(&config, &positions());
            assert!(
                matches!(result, Err(CompileError::InvalidNestParameter { .. })),
                "theta {theta} should be rejected"
            );
        }
    }

    #[test]
    fn test_every_alternative_placed_once() {
        let missing = nest(
            "root",
            1.0,
            vec![NestChildConfig::Alternative(10), NestChildConfig::Alternative(20)],
        );
        assert!(NestTree::from_config(&missing, &positions()).is_err());

        let twice = nest(
            "root",
            1.0,
            vec![
                NestChildConfig::Alternative(10),
                NestChildConfig::Alternative(20),
                NestChildConfig::Alternative(30),
                NestChildConfig::Alternative(10),
            ],
        );
        assert!(NestTree::from_config(&twice, &positions()).is_err());

        let unknown = nest("root", 1.0, vec![NestChildConfig::Alternative(99)]);
        assert!(NestTree::from_config(&unknown, &positions()).is_err());
    }

    #[test]
    fn test_empty_nest_and_duplicate_names() {
        let empty = nest(
            "root",
            1.0,
            vec![
                NestChildConfig::Alternative(10),
                NestChildConfig::Alternative(20),
                NestChildConfig::Alternative(30),
                NestChildConfig::Nest(nest("hollow", 0.5, vec![])),
            ],
        );
        assert!(NestTree::from_config(&empty, &positions()).is_err());

        let duplicate = nest(
            "root",
            1.0,
            vec![
                NestChildConfig::Alternative(10),
                NestChildConfig::Nest(nest("root", 0.5, vec![NestChildConfig::Alternative(20)])),
                NestChildConfig::Alternative(30),
            ],
        );
        assert!(NestTree::from_config(&duplicate, &positions()).is_err());
    }

    #[test]
    fn test_flat_tree() {
        let tree = NestTree::flat(3);
        assert!(tree.is_flat());
        assert_eq!(tree.root().children.len(), 3);
    }
}
