use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::bridge::{BorrowedValue, BridgeError, ForeignValue};
use crate::models::{Coordinate, CornerLayout, Rectangle};

/// Arrange the four decoded components into a rectangle.
///
/// `grid[i][j]` is item `j` of the `i`-th inner tuple.
pub fn assemble(grid: [[u16; 2]; 2], layout: CornerLayout) -> Rectangle {
    match layout {
        CornerLayout::Axes => Rectangle::new(
            Coordinate::new(grid[0][0], grid[1][0]),
            Coordinate::new(grid[0][1], grid[1][1]),
        ),
        CornerLayout::Points => Rectangle::new(
            Coordinate::new(grid[0][0], grid[0][1]),
            Coordinate::new(grid[1][0], grid[1][1]),
        ),
    }
}

/// Decode the corner tuple returned by `function` into a rectangle.
///
/// The value must be a 2-tuple of 2-tuples of integers in `0..=65535`;
/// anything else is reported as [`BridgeError::MalformedResult`].
pub fn extract_rectangle(
    coords: &ForeignValue<'_>,
    layout: CornerLayout,
    function: &str,
) -> Result<Rectangle, BridgeError> {
    let malformed = |reason: String| BridgeError::MalformedResult {
        function: function.to_string(),
        reason,
    };

    let outer = coords
        .as_tuple(2)
        .ok_or_else(|| malformed(format!("expected a tuple of two tuples, got {}", describe(coords))))?;

    let mut grid = [[0u16; 2]; 2];
    for (i, row) in grid.iter_mut().enumerate() {
        let item = BorrowedValue::tuple_item(outer, i)
            .ok_or_else(|| malformed(format!("item [{}] is missing", i)))?;
        let inner = item.as_tuple(2).ok_or_else(|| {
            malformed(format!("item [{}] is a {}, expected a 2-tuple", i, item.type_name()))
        })?;
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = component(inner, i, j).map_err(&malformed)?;
        }
    }

    Ok(assemble(grid, layout))
}

fn component(inner: &Bound<'_, PyTuple>, i: usize, j: usize) -> Result<u16, String> {
    let value = BorrowedValue::tuple_item(inner, j)
        .ok_or_else(|| format!("item [{}][{}] is missing", i, j))?;
    let number: i64 = value.extract().map_err(|_| {
        format!("item [{}][{}] is a {}, expected an integer", i, j, value.type_name())
    })?;
    u16::try_from(number)
        .map_err(|_| format!("item [{}][{}] = {} does not fit in 0..=65535", i, j, number))
}

fn describe(value: &ForeignValue<'_>) -> String {
    match value.as_bound().len() {
        Ok(len) => format!("{} of length {}", value.type_name(), len),
        Err(_) => value.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_layout_pairs_min_and_max() {
        let rect = assemble([[10, 200], [20, 300]], CornerLayout::Axes);
        assert_eq!(rect.left_up, Coordinate::new(10, 20));
        assert_eq!(rect.right_down, Coordinate::new(200, 300));
    }

    #[test]
    fn points_layout_reads_corners_directly() {
        let rect = assemble([[10, 20], [200, 300]], CornerLayout::Points);
        assert_eq!(rect.left_up, Coordinate::new(10, 20));
        assert_eq!(rect.right_down, Coordinate::new(200, 300));
    }
}
