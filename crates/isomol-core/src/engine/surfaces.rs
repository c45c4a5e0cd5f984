use crate::core::mesher;
use crate::core::models::grid::{CombineOp, ScalarGrid};
use crate::core::models::mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// Isolevel changes at or below this threshold are ignored, suppressing
/// recompute thrash while a user drags a continuous control.
pub const LEVEL_EPSILON: f64 = 1e-6;

/// Identity of one isosurface within a [`SurfaceSet`]. Ids come from a
/// running counter and are never reused, even across removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Which density field the set's surfaces are extracted from.
///
/// The combined channels exist only while both grids are loaded with
/// bit-for-bit identical geometry; see
/// [`SurfaceSet::combined_channels_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DensityChannel {
    /// Grid A alone.
    #[default]
    GridA,
    /// Grid B alone.
    GridB,
    /// Element-wise `A + B`.
    Sum,
    /// Element-wise `A - B`.
    DiffAB,
    /// Element-wise `B - A`.
    DiffBA,
}

impl DensityChannel {
    /// Whether this channel combines both grids.
    pub fn is_combined(self) -> bool {
        matches!(
            self,
            DensityChannel::Sum | DensityChannel::DiffAB | DensityChannel::DiffBA
        )
    }
}

/// How the rendering layer should draw a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStyle {
    #[default]
    Solid,
    Wireframe,
    Dots,
}

/// One named isosurface: identity, display attributes, and the owned mesh.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    isolevel: f64,
    mesh: Mesh,
    /// Whether the rendering layer should draw this surface at all.
    pub visible: bool,
    pub style: RenderStyle,
    /// Blend opacity in `[0, 1]`.
    pub opacity: f32,
    /// Linear RGB display color.
    pub color: [f32; 3],
}

impl Surface {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn isolevel(&self) -> f64 {
        self.isolevel
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Owns zero-or-more isosurfaces sharing one density field.
///
/// The field is grid A, grid B, or an element-wise combination of the two
/// when their geometries match exactly. Grids are replaced wholesale; any
/// replacement re-extracts every surface, and a missing or incompatible
/// field collapses surfaces to empty meshes rather than raising an error.
/// Triggering a redraw afterwards is the caller's responsibility.
#[derive(Debug, Default)]
pub struct SurfaceSet {
    grid_a: Option<ScalarGrid>,
    grid_b: Option<ScalarGrid>,
    channel: DensityChannel,
    surfaces: Vec<Surface>,
    next_id: u64,
}

impl SurfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid_a(&self) -> Option<&ScalarGrid> {
        self.grid_a.as_ref()
    }

    pub fn grid_b(&self) -> Option<&ScalarGrid> {
        self.grid_b.as_ref()
    }

    /// Replaces grid slot A and re-extracts every surface.
    pub fn set_grid_a(&mut self, grid: Option<ScalarGrid>) {
        self.grid_a = grid;
        self.ensure_channel_available();
        self.refresh_all();
    }

    /// Replaces grid slot B and re-extracts every surface.
    pub fn set_grid_b(&mut self, grid: Option<ScalarGrid>) {
        self.grid_b = grid;
        self.ensure_channel_available();
        self.refresh_all();
    }

    /// Drops both grids; every surface collapses to an empty mesh.
    pub fn clear_grids(&mut self) {
        self.grid_a = None;
        self.grid_b = None;
        self.channel = DensityChannel::GridA;
        self.refresh_all();
    }

    pub fn channel(&self) -> DensityChannel {
        self.channel
    }

    /// Switches the active density channel.
    ///
    /// # Return
    ///
    /// Returns `false` (leaving the current channel in place) when the
    /// requested channel is not available.
    pub fn set_channel(&mut self, channel: DensityChannel) -> bool {
        if !self.channel_available(channel) {
            return false;
        }
        if channel != self.channel {
            self.channel = channel;
            self.refresh_all();
        }
        true
    }

    /// Whether a channel can currently be selected.
    pub fn channel_available(&self, channel: DensityChannel) -> bool {
        match channel {
            DensityChannel::GridA => self.grid_a.is_some(),
            DensityChannel::GridB => self.grid_b.is_some(),
            _ => self.combined_channels_available(),
        }
    }

    /// Capability flag for the combined channels: both grids loaded with
    /// exactly matching geometry.
    pub fn combined_channels_available(&self) -> bool {
        match (&self.grid_a, &self.grid_b) {
            (Some(a), Some(b)) => a.same_geometry(b),
            _ => false,
        }
    }

    /// Extracts a new surface at `isolevel` with default display
    /// attributes, returning its never-reused id.
    pub fn add_surface(&mut self, isolevel: f64) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        let mesh = self.extract_at(isolevel);
        debug!(%id, isolevel, triangles = mesh.triangle_count(), "Added isosurface.");
        self.surfaces.push(Surface {
            id,
            isolevel,
            mesh,
            visible: true,
            style: RenderStyle::default(),
            opacity: 1.0,
            color: [0.2, 0.55, 0.85],
        });
        id
    }

    /// Moves a surface to a new isolevel, re-extracting its mesh.
    ///
    /// # Return
    ///
    /// Returns `true` when a recompute actually happened. Changes within
    /// [`LEVEL_EPSILON`] of the current level and unknown ids are no-ops.
    pub fn change_surface(&mut self, id: SurfaceId, isolevel: f64) -> bool {
        let Some(index) = self.surfaces.iter().position(|s| s.id == id) else {
            return false;
        };
        if (isolevel - self.surfaces[index].isolevel).abs() <= LEVEL_EPSILON {
            return false;
        }
        let mesh = self.extract_at(isolevel);
        debug!(%id, isolevel, triangles = mesh.triangle_count(), "Re-extracted isosurface.");
        let surface = &mut self.surfaces[index];
        surface.isolevel = isolevel;
        surface.mesh = mesh;
        true
    }

    /// Discards a surface together with its mesh and attributes.
    pub fn remove_surface(&mut self, id: SurfaceId) -> bool {
        let Some(index) = self.surfaces.iter().position(|s| s.id == id) else {
            return false;
        };
        let _ = self.surfaces.remove(index);
        debug!(%id, "Removed isosurface.");
        true
    }

    pub fn clear_surfaces(&mut self) {
        self.surfaces.clear();
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.id == id)
    }

    /// Mutable access for display-attribute edits (visibility, style,
    /// opacity, color). Isolevel changes go through
    /// [`SurfaceSet::change_surface`] so the mesh stays in sync.
    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.iter_mut().find(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.iter().map(|s| s.id)
    }

    /// The density field the active channel denotes, if its grids are
    /// present and compatible.
    fn active_field(&self) -> Option<Cow<'_, ScalarGrid>> {
        match self.channel {
            DensityChannel::GridA => self.grid_a.as_ref().map(Cow::Borrowed),
            DensityChannel::GridB => self.grid_b.as_ref().map(Cow::Borrowed),
            combined => {
                let a = self.grid_a.as_ref()?;
                let b = self.grid_b.as_ref()?;
                let op = match combined {
                    DensityChannel::Sum => CombineOp::Add,
                    DensityChannel::DiffAB => CombineOp::SubAB,
                    _ => CombineOp::SubBA,
                };
                a.combine(op, b).map(Cow::Owned)
            }
        }
    }

    fn extract_at(&self, isolevel: f64) -> Mesh {
        match self.active_field() {
            Some(field) => mesher::extract(&field, isolevel),
            None => Mesh::empty(isolevel),
        }
    }

    /// Withdraws a channel that lost its grids: combined channels fall
    /// back silently to a single-grid channel, preferring A.
    fn ensure_channel_available(&mut self) {
        if self.channel_available(self.channel) {
            return;
        }
        let fallback = if self.grid_a.is_some() || self.grid_b.is_none() {
            DensityChannel::GridA
        } else {
            DensityChannel::GridB
        };
        debug!(from = ?self.channel, to = ?fallback, "Density channel withdrawn.");
        self.channel = fallback;
    }

    fn refresh_all(&mut self) {
        let meshes: Vec<Mesh> = {
            let field = self.active_field();
            self.surfaces
                .iter()
                .map(|s| match &field {
                    Some(f) => mesher::extract(f, s.isolevel),
                    None => Mesh::empty(s.isolevel),
                })
                .collect()
        };
        for (surface, mesh) in self.surfaces.iter_mut().zip(meshes) {
            surface.mesh = mesh;
        }
    }
}
