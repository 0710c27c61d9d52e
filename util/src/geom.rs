use glam::IVec2;

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// 4 cardinal directions, clock face order.
pub const DIR_4: [IVec2; 4] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 0]),
];

/// 4 diagonal directions, clock face order starting from northeast.
pub const DIAGONALS: [IVec2; 4] = [
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, -1]),
];

pub trait VecExt: Sized + Default {
    /// Absolute size of vector in taxicab metric.
    fn taxi_len(&self) -> i32;

    /// Absolute size of vector in chessboard metric, the number of king's
    /// moves it takes to cross it.
    fn chess_len(&self) -> i32;

    /// Vec points to one of the 8 cells surrounding the origin.
    fn is_adjacent(&self) -> bool {
        self.chess_len() == 1
    }
}

impl VecExt for IVec2 {
    fn taxi_len(&self) -> i32 {
        self[0].abs() + self[1].abs()
    }

    fn chess_len(&self) -> i32 {
        self[0].abs().max(self[1].abs())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;

    #[test]
    fn direction_sets() {
        for d in DIR_8 {
            assert!(d.is_adjacent());
        }
        for d in DIR_4 {
            assert_eq!(d.taxi_len(), 1);
            assert!(DIR_8.contains(&d));
        }
        for d in DIAGONALS {
            assert_eq!(d.taxi_len(), 2);
            assert!(DIR_8.contains(&d));
        }
    }

    #[test]
    fn metrics() {
        assert_eq!(ivec2(3, -5).taxi_len(), 8);
        assert_eq!(ivec2(3, -5).chess_len(), 5);
        assert!(!IVec2::ZERO.is_adjacent());
        assert!(!ivec2(2, 1).is_adjacent());
    }
}
