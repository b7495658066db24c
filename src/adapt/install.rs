//! Writing template children over the slots of the elements they replace.

use crate::mesh_error::MeshAdaptError;
use crate::topology::mesh::Mesh;
use crate::topology::template::Slots;

/// What [`install`] did besides overwriting slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Installed {
    /// Ids of all children, in template order.
    pub elements: Vec<usize>,
    /// Number of children appended at the end of the element table.
    pub appended: usize,
    /// Slots removed, in removal order (each by swap-with-last).
    pub removed: Vec<usize>,
}

/// Replace the elements in `slots` by `children`.
///
/// Children take the smallest slots first. Extra children are appended;
/// surplus slots are removed from the largest down, so the smallest id
/// always survives. Adjacency is not touched; callers relink afterwards.
pub fn install(
    mesh: &mut Mesh,
    slots: &[usize],
    children: &[Slots],
) -> Result<Installed, MeshAdaptError> {
    let mut sorted = slots.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let mut out = Installed::default();
    for (i, child) in children.iter().enumerate() {
        match sorted.get(i) {
            Some(&slot) => {
                mesh.replace_element(slot, *child)?;
                out.elements.push(slot);
            }
            None => {
                out.elements.push(mesh.add_element(*child)?);
                out.appended += 1;
            }
        }
    }
    if sorted.len() > children.len() {
        for &slot in sorted[children.len()..].iter().rev() {
            if let Some(from) = mesh.remove_element(slot)? {
                // a surviving child may have been the last element
                for id in out.elements.iter_mut() {
                    if *id == from {
                        *id = slot;
                    }
                }
            }
            out.removed.push(slot);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surplus_slots_are_removed_from_the_top() {
        let mut mesh = Mesh::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [2.0, 0.0]],
            &[[1, 2, 3, 0], [1, 3, 4, 0], [2, 5, 3, 0]],
        )
        .unwrap();
        let done = install(&mut mesh, &[2, 1], &[[1, 2, 3, 4]]).unwrap();
        assert_eq!(done.elements, vec![1]);
        assert_eq!(done.removed, vec![2]);
        assert_eq!(mesh.nel(), 2);
        assert_eq!(mesh.element(2), [2, 5, 3, 0]);
        mesh.relink(&[1, 2]).unwrap();
        assert_eq!(mesh.neighbours(1)[1], 2);
    }
}
