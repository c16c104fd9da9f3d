use indexmap::IndexSet;
use std::hash::Hash;

type Stage<'a, T> = Box<dyn Fn(&[T]) -> Vec<T> + 'a>;

//builds parameter combinations stage by stage
//
//every stage is called once per combination built so far, with that combination's
//values, and extends it by each value it returns. a stage returning nothing drops the
//combination; equal combinations are kept once, in first-seen order
pub struct ParameterGrid<'a, T> {
    stages: Vec<Stage<'a, T>>,
}

impl<'a, T> ParameterGrid<'a, T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        ParameterGrid { stages: Vec::new() }
    }

    //adds a stage whose values may depend on the previous stages' values
    pub fn stage<F>(mut self, generate: F) -> Self
    where
        F: Fn(&[T]) -> Vec<T> + 'a,
    {
        self.stages.push(Box::new(generate));
        self
    }

    //adds a stage with fixed values
    pub fn values(self, values: Vec<T>) -> Self
    where
        T: 'a,
    {
        self.stage(move |_previous: &[T]| values.clone())
    }

    //a grid without stages yields one empty combination
    pub fn generate(&self) -> Vec<Vec<T>> {
        let mut combinations: IndexSet<Vec<T>> = IndexSet::new();
        combinations.insert(Vec::new());

        for stage in &self.stages {
            let mut next = IndexSet::new();
            for previous in &combinations {
                for value in stage(previous.as_slice()) {
                    let mut combination = previous.clone();
                    combination.push(value);
                    next.insert(combination);
                }
            }
            combinations = next;
        }

        combinations.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<'a, T> Default for ParameterGrid<'a, T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_has_one_empty_combination() {
        let grid: ParameterGrid<u32> = ParameterGrid::new();
        assert!(grid.is_empty());
        assert_eq!(grid.generate(), vec![Vec::<u32>::new()]);
    }

    #[test]
    fn test_cartesian_product() {
        let grid = ParameterGrid::new().values(vec![0, 1]).values(vec![0, 1]);
        assert_eq!(grid.len(), 2);
        assert_eq!(
            grid.generate(),
            vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]
        );
    }

    #[test]
    fn test_stage_receives_previous_values() {
        let grid = ParameterGrid::new()
            .values(vec![1, 2])
            .stage(|previous: &[usize]| vec![previous[0]]);
        assert_eq!(grid.generate(), vec![vec![1, 1], vec![2, 2]]);

        let grid = ParameterGrid::new()
            .values(vec![1, 2])
            .stage(|previous: &[usize]| (0..previous[0]).collect());
        assert_eq!(grid.generate(), vec![vec![1, 0], vec![2, 0], vec![2, 1]]);
    }

    #[test]
    fn test_empty_stage_drops_combination() {
        let grid = ParameterGrid::new()
            .values(vec![0, 1])
            .stage(|previous: &[usize]| (0..previous[0]).collect());
        assert_eq!(grid.generate(), vec![vec![1, 0]]);
    }

    #[test]
    fn test_duplicates_are_removed() {
        let grid = ParameterGrid::new().values(vec![1, 1]).values(vec![1, 2]);
        assert_eq!(grid.generate(), vec![vec![1, 1], vec![1, 2]]);
    }
}
