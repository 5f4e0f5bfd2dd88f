use super::selection::{SelectionError, SelectionList};

/// Which neighbour an entry is swapped with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end of the list.
    Forward,
    /// Towards the start of the list.
    Backward,
}

/// Swap the item at `index` with its neighbour in `direction`.
///
/// Moving past either end leaves the list as it is. This is a single adjacent
/// transposition; relocating further takes repeated moves.
pub fn move_item<T: Clone>(
    items: &[T],
    index: usize,
    direction: Direction,
) -> Result<Vec<T>, SelectionError> {
    if index >= items.len() {
        return Err(SelectionError::InvalidIndex {
            index,
            len: items.len(),
        });
    }

    let target = match direction {
        Direction::Forward => index + 1,
        Direction::Backward => match index.checked_sub(1) {
            Some(t) => t,
            None => return Ok(items.to_vec()),
        },
    };

    let mut result = items.to_vec();
    if target < result.len() {
        result.swap(index, target);
    }
    Ok(result)
}

/// `move_item` over a selection.
pub fn move_selection(
    list: &SelectionList,
    index: usize,
    direction: Direction,
) -> Result<SelectionList, SelectionError> {
    move_item(list.as_slice(), index, direction).map(SelectionList::from)
}
