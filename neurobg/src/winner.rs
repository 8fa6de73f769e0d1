use rand::{Rng, seq::IndexedRandom};

use crate::neuron::Neuron;

/// Mark one charged output neuron as the winner, picked uniformly at random.
///
/// All winner flags are cleared first, so with nothing above `threshold`
/// there is no winner. Returns the index of the winner within `outputs`.
pub fn select_winner(outputs: &mut [Neuron], threshold: f32, rng: &mut impl Rng) -> Option<usize> {
    let charged: Vec<usize> = outputs
        .iter()
        .enumerate()
        .filter(|(_, n)| n.accumulated_charge > threshold)
        .map(|(i, _)| i)
        .collect();

    for n in outputs.iter_mut() {
        n.is_winner = false;
    }

    let &winner = charged.choose(rng)?;
    outputs[winner].is_winner = true;
    tracing::trace!(winner, candidates = charged.len(), "output winner");
    Some(winner)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{neuron::LayerKind, render::Point};

    fn outputs(charges: &[f32]) -> Vec<Neuron> {
        let mut rng = StdRng::seed_from_u64(3);
        charges
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let mut n = Neuron::new(Point::default(), 2, i, LayerKind::Output, &mut rng);
                n.accumulated_charge = c;
                n
            })
            .collect()
    }

    #[test]
    fn no_charge_no_winner() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = outputs(&[0.0, 0.1, 0.15]);
        out[1].is_winner = true;

        assert_eq!(select_winner(&mut out, 0.15, &mut rng), None);
        assert!(out.iter().all(|n| !n.is_winner));
    }

    #[test]
    fn picks_among_charged_only() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = outputs(&[0.0, 0.5, 0.0, 0.9]);

        let mut seen = [false; 4];
        for _ in 0..200 {
            let winner = select_winner(&mut out, 0.15, &mut rng).unwrap();
            assert!(winner == 1 || winner == 3);
            assert_eq!(out.iter().filter(|n| n.is_winner).count(), 1);
            assert!(out[winner].is_winner);
            seen[winner] = true;
        }
        assert!(seen[1] && seen[3]);
    }
}
