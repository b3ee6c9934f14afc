//! Assertion helpers with diagnostic output. Every failure names the
//! scenario and the expected-versus-actual counts.

use cdt_kernel::validation::audit_complex;
use cdt_kernel::Spacetime;

use crate::helpers::HarnessError;

/// Assert exact vertex/edge/component counts.
pub fn assert_counts(
    spacetime: &mut Spacetime,
    expected_vertices: usize,
    expected_edges: usize,
    expected_components: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let vertices = spacetime.vertex_count();
    let edges = spacetime.edge_count();
    let components = spacetime.get_connected_components().len();

    if vertices == expected_vertices
        && edges == expected_edges
        && components == expected_components
    {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] expected V={expected_vertices} E={expected_edges} C={expected_components}, \
                 got V={vertices} E={edges} C={components}",
            ),
        })
    }
}

/// Assert the full invariant audit comes back clean.
pub fn assert_audit_clean(spacetime: &Spacetime, ctx: &str) -> Result<(), HarnessError> {
    let audit = audit_complex(spacetime);
    if audit.is_valid() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{ctx}] {audit}"),
        })
    }
}
