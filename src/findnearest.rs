use crate::geometry::*;

pub trait HasPosition {
    fn pos(&self) -> Position;
}

impl HasPosition for Position {
    fn pos(&self) -> Position {
        *self
    }
}

impl HasPosition for &Position {
    fn pos(&self) -> Position {
        **self
    }
}

/// Nearest-by-torus-distance helpers. Ties go to the earliest item, which keeps every caller deterministic.
#[cfg_attr(feature = "profile", timing_annotate::timing)]
pub trait FindNearestItertools: Iterator {
    fn find_nearest_linear_distance<V>(self, torus: Torus, other_pos: Position) -> Option<i32>
    where
        Self: Iterator<Item = V> + Sized,
        V: HasPosition,
    {
        self.map(|pos_object| torus.distance(other_pos, pos_object.pos())).min()
    }

    fn find_nearest_linear_by<F, V>(self, torus: Torus, other_pos: Position, pos_generator: F) -> Option<V>
    where
        Self: Iterator<Item = V> + Sized,
        F: Fn(&V) -> Position,
    {
        self.map(|pos_object| (torus.distance(other_pos, pos_generator(&pos_object)), pos_object))
            .min_by_key(|(length, _)| *length)
            .map(|(_, pos_object)| pos_object)
    }
}

impl<T: ?Sized> FindNearestItertools for T where T: Iterator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_prefers_first_on_ties() {
        let torus = Torus::new(10, 10);
        let bases = [Position::new(2, 0), Position::new(0, 2), Position::new(9, 9)];

        assert_eq!(bases.iter().find_nearest_linear_by(torus, Position::new(9, 0), |base| **base), Some(&Position::new(9, 9)));
        assert_eq!(bases.iter().find_nearest_linear_by(torus, Position::new(1, 1), |base| **base), Some(&Position::new(2, 0)));
        assert_eq!(bases.iter().find_nearest_linear_distance(torus, Position::new(5, 5)), Some(8));
    }
}
