use crate::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

impl Weighted<(State, Continous)> for Transition {
    fn s(&self) -> (State, Continous) {
        (self.next_state, self.reward)
    }

    fn p(&self) -> Continous {
        self.probability
    }
}

/// Draws one item proportionally to its weight. `None` when the weights cannot
/// form a distribution (empty, all zero, negative or NaN).
pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Option<S>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p())).ok()?;
    ts.get(dist.sample(rng)).map(|item| item.s())
}

/// Index and value of the largest element. The lowest index wins ties.
pub fn argmax<I>(values: I) -> Option<(usize, Continous)>
where
    I: IntoIterator<Item = Continous>,
{
    values
        .into_iter()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use rand::prelude::*;

    struct TX {
        pub s: usize,
        pub p: Continous,
    }

    impl Weighted<usize> for TX {
        fn p(&self) -> Continous {
            self.p
        }

        fn s(&self) -> usize {
            self.s
        }
    }

    #[test]
    fn test_pick_next_seeded() {
        let items = vec![TX { s: 0, p: 0.2 }, TX { s: 1, p: 0.8 }];
        let mut counts = [0; 2];

        let rng = &mut StdRng::seed_from_u64(2718);
        let n = 10000;
        for _ in 0..n {
            let i = pick_next(rng, &items).unwrap();
            counts[i] += 1;
        }

        assert_float_eq!(counts[0] as f64 / n as f64, 0.2, abs <= 2e-2);
        assert_float_eq!(counts[1] as f64 / n as f64, 0.8, abs <= 2e-2);
    }

    #[test]
    fn test_pick_next_degenerate_weights() {
        let rng = &mut StdRng::seed_from_u64(0);
        let empty: Vec<TX> = vec![];
        assert_eq!(pick_next(rng, &empty), None);
        assert_eq!(pick_next(rng, &[TX { s: 3, p: 0. }]), None);
        assert_eq!(pick_next(rng, &[TX { s: 3, p: 1. }]), Some(3));
    }

    #[test]
    fn test_argmax_lowest_index_wins_ties() {
        assert_eq!(argmax([1., 3., 3., 2.]), Some((1, 3.)));
        assert_eq!(argmax([0., 0., 0., 0.]), Some((0, 0.)));
        assert_eq!(argmax([-2., -1.]), Some((1, -1.)));
        assert_eq!(argmax(Vec::<Continous>::new()), None);
    }
}
