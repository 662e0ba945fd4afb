//! Triangle mesh geometry
//!
//! Parameters:
//!
//! | name            | type          | required |
//! |-----------------|---------------|----------|
//! | `vertex`        | Float3 data   | yes      |
//! | `index`         | Int3 data     | yes      |
//! | `vertex.normal` | Float3 data   | no       |
//! | `vertex.color`  | Float4 data   | no       |
//!
//! Per-vertex arrays must have one entry per vertex, and every index must
//! name an existing vertex.

use super::GeometryVariant;
use crate::foundation::collections::ObjectHandle;
use crate::kernel::TriangleMeshData;
use crate::object::{CommitContext, DataBuffer, ObjectCore, ObjectResult};

/// Indexed triangle mesh
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleMesh;

impl TriangleMesh {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "triangles";
}

/// Check that an optional per-vertex array matches the vertex count
fn per_vertex<T>(core: &ObjectCore, name: &str, items: Vec<T>, vertex_count: usize) -> ObjectResult<Vec<T>> {
    if items.len() == vertex_count {
        Ok(items)
    } else {
        Err(core.invalid_data(
            name,
            format!("{} entries for {} vertices", items.len(), vertex_count),
        ))
    }
}

/// Convert signed triangle indices, rejecting any that fall outside the mesh
fn checked_indices(core: &ObjectCore, raw: &[[i32; 3]], vertex_count: usize) -> ObjectResult<Vec<[u32; 3]>> {
    raw.iter()
        .enumerate()
        .map(|(triangle, corners)| {
            let mut out = [0u32; 3];
            for (slot, &index) in out.iter_mut().zip(corners) {
                match u32::try_from(index) {
                    Ok(index) if (index as usize) < vertex_count => *slot = index,
                    _ => {
                        return Err(core.invalid_data(
                            "index",
                            format!("triangle {} references vertex {} of {}", triangle, index, vertex_count),
                        ))
                    }
                }
            }
            Ok(out)
        })
        .collect()
}

impl GeometryVariant for TriangleMesh {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["vertex", "index"]
    }

    fn finalize(
        &self,
        core: &ObjectCore,
        model: ObjectHandle,
        geometry: ObjectHandle,
        ctx: &mut CommitContext<'_>,
    ) -> ObjectResult<()> {
        let objects = ctx.objects();

        let vertices = objects.require_data(core, "vertex")?.to_vec3s(core, "vertex")?;
        let raw_indices = objects.require_data(core, "index")?.to_int3s(core, "index")?;
        let indices = checked_indices(core, &raw_indices, vertices.len())?;

        let normals = objects
            .optional_data(core, "vertex.normal")?
            .map(|data: &DataBuffer| data.to_vec3s(core, "vertex.normal"))
            .transpose()?
            .map(|items| per_vertex(core, "vertex.normal", items, vertices.len()))
            .transpose()?;
        let colors = objects
            .optional_data(core, "vertex.color")?
            .map(|data: &DataBuffer| data.to_vec4s(core, "vertex.color"))
            .transpose()?
            .map(|items| per_vertex(core, "vertex.color", items, vertices.len()))
            .transpose()?;

        log::debug!(
            "triangle mesh {:?}: {} vertices, {} triangles",
            geometry,
            vertices.len(),
            indices.len()
        );

        ctx.kernel().set_triangle_mesh(
            model,
            geometry,
            TriangleMeshData {
                vertices: &vertices,
                indices: &indices,
                normals: normals.as_deref(),
                colors: colors.as_deref(),
            },
        )?;
        Ok(())
    }
}
