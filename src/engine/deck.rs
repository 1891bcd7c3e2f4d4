//! Draw piles for the luck and risk card tables.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A pile of indices into a card table. Cards are taken from the top and
/// returned to the bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardPile(VecDeque<usize>);

impl CardPile {
    /// Every index `0..size`, shuffled.
    pub fn shuffled<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut cards: Vec<usize> = (0..size).collect();
        cards.shuffle(rng);
        CardPile(cards.into())
    }

    pub fn from_order(order: Vec<usize>) -> Self {
        CardPile(order.into())
    }

    /// The top card, or `None` when the pile is empty.
    pub fn take(&mut self) -> Option<usize> {
        self.0.pop_front()
    }

    pub fn put_back(&mut self, card: usize) {
        self.0.push_back(card);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top to bottom.
    pub fn order(&self) -> Vec<usize> {
        self.0.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shuffled_pile_holds_every_card_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let pile = CardPile::shuffled(12, &mut rng);
        let mut order = pile.order();
        order.sort_unstable();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn take_from_top_return_to_bottom() {
        let mut pile = CardPile::from_order(vec![3, 1, 2]);
        assert_eq!(pile.take(), Some(3));
        pile.put_back(3);
        assert_eq!(pile.order(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_pile_is_not_an_error() {
        let mut pile = CardPile::default();
        assert!(pile.is_empty());
        assert_eq!(pile.take(), None);
        assert_eq!(pile.len(), 0);
    }
}
