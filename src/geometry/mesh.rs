//! Triangle mesh representation of posed cloth.
//!
//! Vertices use a `Pod` layout so hosts can upload baked fragments without
//! repacking.

use std::collections::{BTreeSet, HashMap};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::Aabb;
use crate::host::MaterialId;

/// Vertex with position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ClothVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl ClothVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Indexed triangle mesh with one material per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClothMesh {
    pub vertices: Vec<ClothVertex>,
    pub triangles: Vec<[u32; 3]>,
    /// Material of each triangle, parallel to `triangles`.
    pub materials: Vec<MaterialId>,
}

impl ClothMesh {
    /// Build a mesh. Triangles referencing missing vertices are dropped;
    /// triangles without a material entry get material 0.
    pub fn new(
        vertices: Vec<ClothVertex>,
        triangles: Vec<[u32; 3]>,
        materials: Vec<MaterialId>,
    ) -> Self {
        let vertex_count = vertices.len() as u32;
        let (triangles, materials) = triangles
            .into_iter()
            .enumerate()
            .filter(|(_, tri)| tri.iter().all(|&i| i < vertex_count))
            .map(|(i, tri)| (tri, materials.get(i).copied().unwrap_or_default()))
            .unzip();
        Self {
            vertices,
            triangles,
            materials,
        }
    }

    /// A flat rectangular panel in the XY plane facing +Z, split into
    /// `columns x rows` quads.
    pub fn panel(
        center: Vec3,
        width: f32,
        height: f32,
        columns: u32,
        rows: u32,
        material: MaterialId,
    ) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let origin = center - Vec3::new(width * 0.5, height * 0.5, 0.0);

        let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
        for row in 0..=rows {
            for col in 0..=columns {
                let p = origin
                    + Vec3::new(
                        width * col as f32 / columns as f32,
                        height * row as f32 / rows as f32,
                        0.0,
                    );
                vertices.push(ClothVertex::new(p.to_array(), [0.0, 0.0, 1.0]));
            }
        }

        let stride = columns + 1;
        let mut triangles = Vec::with_capacity((columns * rows * 2) as usize);
        for row in 0..rows {
            for col in 0..columns {
                let i0 = row * stride + col;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;
                triangles.push([i0, i1, i3]);
                triangles.push([i0, i3, i2]);
            }
        }

        let materials = vec![material; triangles.len()];
        Self {
            vertices,
            triangles,
            materials,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of triangle `index`.
    ///
    /// # Panics
    ///
    /// If `index` or one of its vertex indices is out of range. Meshes built
    /// field by field should go through [`sanitized`](Self::sanitized) first.
    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize].position(),
            self.vertices[b as usize].position(),
            self.vertices[c as usize].position(),
        ]
    }

    pub fn triangle_centroid(&self, index: usize) -> Vec3 {
        let [a, b, c] = self.triangle(index);
        (a + b + c) / 3.0
    }

    /// Corner positions, or `None` for a triangle with a missing vertex.
    fn corners(&self, index: usize) -> Option<[Vec3; 3]> {
        let tri = self.triangles.get(index)?;
        let mut corners = [Vec3::ZERO; 3];
        for (corner, &i) in corners.iter_mut().zip(tri) {
            *corner = self.vertices.get(i as usize)?.position();
        }
        Some(corners)
    }

    fn centroid_of(&self, index: usize) -> Option<Vec3> {
        self.corners(index).map(|[a, b, c]| (a + b + c) / 3.0)
    }

    /// Material of triangle `index`; material 0 when the entry is missing.
    pub fn triangle_material(&self, index: usize) -> MaterialId {
        self.materials.get(index).copied().unwrap_or_default()
    }

    /// Rebuild through [`new`](Self::new): drops triangles with missing
    /// vertices and pads the material list.
    pub fn sanitized(self) -> Self {
        Self::new(self.vertices, self.triangles, self.materials)
    }

    /// Distinct materials referenced by the triangles.
    pub fn material_ids(&self) -> BTreeSet<MaterialId> {
        self.materials.iter().copied().collect()
    }

    /// Keep only triangles for which `keep(index)` is true, dropping
    /// vertices no kept triangle references.
    ///
    /// Triangles with a missing vertex are dropped before `keep` sees them.
    pub fn select_triangles(&self, mut keep: impl FnMut(usize) -> bool) -> ClothMesh {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        let mut materials = Vec::new();

        for (index, tri) in self.triangles.iter().enumerate() {
            if self.corners(index).is_none() || !keep(index) {
                continue;
            }
            let mapped = tri.map(|old| {
                *remap.entry(old).or_insert_with(|| {
                    vertices.push(self.vertices[old as usize]);
                    (vertices.len() - 1) as u32
                })
            });
            triangles.push(mapped);
            materials.push(self.triangle_material(index));
        }

        ClothMesh {
            vertices,
            triangles,
            materials,
        }
    }

    /// Sub-mesh made of the triangles using `material`.
    pub fn filter_material(&self, material: MaterialId) -> ClothMesh {
        self.select_triangles(|i| self.triangle_material(i) == material)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(ClothVertex::position))
    }

    /// Mean of the triangle centroids.
    pub fn center(&self) -> Option<Vec3> {
        let (sum, count) = (0..self.triangle_count())
            .filter_map(|i| self.centroid_of(i))
            .fold((Vec3::ZERO, 0usize), |(sum, n), c| (sum + c, n + 1));
        (count > 0).then(|| sum / count as f32)
    }

    /// Largest distance from [`center`](Self::center) to any vertex.
    pub fn bounding_radius(&self) -> f32 {
        let Some(center) = self.center() else {
            return 0.0;
        };
        self.vertices
            .iter()
            .map(|v| v.position().distance(center))
            .fold(0.0, f32::max)
    }

    /// Material of the triangle whose centroid is closest to `point`.
    pub fn nearest_material(&self, point: Vec3) -> Option<MaterialId> {
        (0..self.triangle_count())
            .filter_map(|i| Some((self.centroid_of(i)?.distance_squared(point), i)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, i)| self.triangle_material(i))
    }

    /// Append `other`, re-indexing its triangles.
    pub fn append(&mut self, other: &ClothMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|tri| tri.map(|i| i + base)));
        self.materials.extend_from_slice(&other.materials);
    }

    /// Copy of the mesh with every vertex shifted by `offset`.
    pub fn translated(&self, offset: Vec3) -> ClothMesh {
        let mut mesh = self.clone();
        for v in &mut mesh.vertices {
            v.position = (v.position() + offset).to_array();
        }
        mesh
    }

    /// Raw vertex bytes, ready for a vertex buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Flat `u32` index list.
    pub fn indices(&self) -> &[u32] {
        bytemuck::cast_slice(&self.triangles)
    }
}
