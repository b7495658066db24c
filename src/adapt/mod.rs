//! Indicator-driven red-green adaptation.
//!
//! One call of [`adapt_mesh`] runs a full cycle: refinement marking with
//! conformity closure, refinement, coarsening marking and coarsening. The
//! individual passes and operators are public for callers that drive the
//! cycle themselves.

pub mod coarsen;
pub mod convert;
pub mod install;
pub mod mark_coarsen;
pub mod mark_refine;
pub mod marker;
pub mod observer;
pub mod refine;

use crate::adapt::coarsen::coarsen;
use crate::adapt::mark_coarsen::mark_coarsening;
use crate::adapt::mark_refine::mark_refinement;
use crate::adapt::observer::{MeshObserver, Notifier};
use crate::adapt::refine::refine;
use crate::mesh_error::MeshAdaptError;
use crate::topology::mesh::Mesh;
use serde::{Deserialize, Serialize};

/// Thresholds and switches for one adaptation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptOptions {
    /// Refine elements whose indicator exceeds this value.
    pub refine_tolerance: f64,
    /// Elements whose indicator is at least this value are kept.
    pub coarsen_tolerance: f64,
    /// Elements at this subdivision level are not refined further.
    pub max_subdivision: u32,
    /// Escalate two marked triangle edges to a full red refinement
    /// instead of a `Tria3Tria` closure.
    pub escalate_tria3tria: bool,
    /// Run the refinement half of the cycle.
    pub refine: bool,
    /// Run the coarsening half of the cycle.
    pub coarsen: bool,
}

impl Default for AdaptOptions {
    fn default() -> Self {
        Self {
            refine_tolerance: 0.5,
            coarsen_tolerance: 0.1,
            max_subdivision: 3,
            escalate_tria3tria: true,
            refine: true,
            coarsen: true,
        }
    }
}

impl AdaptOptions {
    pub fn validate(&self) -> Result<(), MeshAdaptError> {
        for (name, value) in [
            ("refine_tolerance", self.refine_tolerance),
            ("coarsen_tolerance", self.coarsen_tolerance),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(MeshAdaptError::InvalidOptions(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.coarsen_tolerance > self.refine_tolerance {
            return Err(MeshAdaptError::InvalidOptions(format!(
                "coarsen_tolerance {} exceeds refine_tolerance {}",
                self.coarsen_tolerance, self.refine_tolerance
            )));
        }
        Ok(())
    }
}

/// What one call of [`adapt_mesh`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptReport {
    /// Elements that received a refinement marker.
    pub elements_marked: usize,
    /// Green patches promoted to red while marking.
    pub conversions: usize,
    pub vertices_created: usize,
    pub elements_created: usize,
    /// Patches that received a coarsening marker.
    pub patches_coarsened: usize,
    pub vertices_removed: usize,
    pub elements_removed: usize,
}

/// Run one adaptation cycle on `mesh`.
///
/// `indicator` holds one value per element of the input mesh. Elements
/// created by refinement inherit the value of the element they come from
/// when the coarsening half of the cycle runs. Every structural change is
/// reported to `observer`.
pub fn adapt_mesh(
    mesh: &mut Mesh,
    indicator: &[f64],
    options: &AdaptOptions,
    observer: Option<&mut dyn MeshObserver>,
) -> Result<AdaptReport, MeshAdaptError> {
    options.validate()?;
    if indicator.len() != mesh.nel() {
        return Err(MeshAdaptError::IndicatorLengthMismatch {
            expected: mesh.nel(),
            found: indicator.len(),
        });
    }
    let mut notifier = Notifier::new(observer);
    let mut report = AdaptReport::default();
    mesh.unlock_all();

    let mut origin: Vec<usize> = (0..=mesh.nel()).collect();
    if options.refine {
        let (nvt0, nel0) = (mesh.nvt(), mesh.nel());
        let marking = mark_refinement(mesh, indicator, options, &mut notifier)?;
        report.elements_marked = marking.num_marked();
        report.conversions = marking.conversions;
        let outcome = refine(mesh, &marking, &mut notifier)?;
        // conversions during marking count as created entities too
        report.vertices_created = mesh.nvt() - nvt0;
        report.elements_created = mesh.nel() - nel0;
        origin = outcome.element_origin;
        crate::debug_invariants!(
            crate::debug_invariants::DebugInvariants::validate_invariants(mesh),
            "after refinement"
        );
    }

    if options.coarsen {
        let mapped: Vec<f64> = origin[1..].iter().map(|&o| indicator[o - 1]).collect();
        let marking = mark_coarsening(mesh, &mapped, options)?;
        report.patches_coarsened = marking.num_marked();
        let outcome = coarsen(mesh, &marking.markers, &mut notifier)?;
        report.vertices_removed = outcome.vertices_removed;
        report.elements_removed = outcome.elements_removed;
        crate::debug_invariants!(
            crate::debug_invariants::DebugInvariants::validate_invariants(mesh),
            "after coarsening"
        );
    }
    log::debug!("adaptation cycle finished: {report:?}");
    Ok(report)
}
