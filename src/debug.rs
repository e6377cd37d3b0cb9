//! Recorded debug overlay.
//!
//! [`DebugLines`] implements [`DebugDraw`] by tessellating spheres into
//! colored line segments and keeping text labels, each until its duration
//! runs out. Renderers upload [`DebugLines::vertices`] as a line list.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::host::DebugDraw;

/// Segments per circle.
const CIRCLE_SEGMENTS: usize = 24;

/// Vertex with position and color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// A wireframe sphere: three axis-aligned great circles.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugSphere {
    pub center: Vec3,
    pub radius: f32,
    pub color: [f32; 4],
    pub remaining: f32,
}

impl DebugSphere {
    /// Line segments of the wireframe.
    pub fn segments(&self) -> Vec<(Vec3, Vec3)> {
        let mut segments = Vec::with_capacity(CIRCLE_SEGMENTS * 3);
        let axes = [(Vec3::X, Vec3::Y), (Vec3::Y, Vec3::Z), (Vec3::Z, Vec3::X)];
        for (u, v) in axes {
            let point = |i: usize| {
                let angle = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
                self.center + (u * angle.cos() + v * angle.sin()) * self.radius
            };
            for i in 0..CIRCLE_SEGMENTS {
                segments.push((point(i), point(i + 1)));
            }
        }
        segments
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugLabel {
    pub location: Vec3,
    pub text: String,
    pub color: [f32; 4],
    pub remaining: f32,
}

/// Overlay primitives still on screen.
#[derive(Debug, Clone, Default)]
pub struct DebugLines {
    spheres: Vec<DebugSphere>,
    labels: Vec<DebugLabel>,
}

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spheres(&self) -> &[DebugSphere] {
        &self.spheres
    }

    pub fn labels(&self) -> &[DebugLabel] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty() && self.labels.is_empty()
    }

    /// Line-list vertices for every live sphere; each pair is one segment.
    pub fn vertices(&self) -> Vec<LineVertex> {
        let mut vertices = Vec::new();
        for sphere in &self.spheres {
            for (start, end) in sphere.segments() {
                vertices.push(LineVertex::new(start.to_array(), sphere.color));
                vertices.push(LineVertex::new(end.to_array(), sphere.color));
            }
        }
        vertices
    }

    /// Age everything by `dt` seconds and drop what has expired.
    pub fn expire(&mut self, dt: f32) {
        for sphere in &mut self.spheres {
            sphere.remaining -= dt;
        }
        for label in &mut self.labels {
            label.remaining -= dt;
        }
        self.spheres.retain(|s| s.remaining > 0.0);
        self.labels.retain(|l| l.remaining > 0.0);
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
        self.labels.clear();
    }
}

impl DebugDraw for DebugLines {
    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: [f32; 4], duration: f32) {
        self.spheres.push(DebugSphere {
            center,
            radius,
            color,
            remaining: duration,
        });
    }

    fn draw_text(&mut self, location: Vec3, text: &str, color: [f32; 4], duration: f32) {
        self.labels.push(DebugLabel {
            location,
            text: text.to_string(),
            color,
            remaining: duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::colors;

    #[test]
    fn test_sphere_segments_on_surface() {
        let sphere = DebugSphere {
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 4.0,
            color: colors::RED,
            remaining: 1.0,
        };
        let segments = sphere.segments();
        assert_eq!(segments.len(), CIRCLE_SEGMENTS * 3);
        for (a, b) in segments {
            assert!((a.distance(sphere.center) - 4.0).abs() < 1e-4);
            assert!((b.distance(sphere.center) - 4.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_vertices_pair_up() {
        let mut lines = DebugLines::new();
        lines.draw_sphere(Vec3::ZERO, 1.0, colors::GREEN, 2.0);
        let vertices = lines.vertices();
        assert_eq!(vertices.len(), CIRCLE_SEGMENTS * 3 * 2);
        assert!(vertices.iter().all(|v| v.color == colors::GREEN));
        assert_eq!(std::mem::size_of::<LineVertex>(), 28);
    }

    #[test]
    fn test_expire() {
        let mut lines = DebugLines::new();
        lines.draw_sphere(Vec3::ZERO, 1.0, colors::RED, 3.0);
        lines.draw_text(Vec3::Z, "Force: 1600.0", colors::WHITE, 1.0);

        lines.expire(1.5);
        assert_eq!(lines.spheres().len(), 1);
        assert!(lines.labels().is_empty());

        lines.expire(1.5);
        assert!(lines.is_empty());
    }
}
