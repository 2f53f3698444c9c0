use glam::Vec2;

use crate::mesh::{Vertex, push_box, push_panel};
use crate::scene::SceneRegistry;
use crate::ui::{UiManager, WidgetKind};

const LABEL: [f32; 3] = [0.12, 0.12, 0.22];
const BUTTON: [f32; 3] = [0.32, 0.32, 0.42];
const FOCUSED: [f32; 3] = [0.95, 0.75, 0.3];
const TRACK: [f32; 3] = [0.2, 0.2, 0.25];
const FILL: [f32; 3] = [0.4, 0.7, 0.95];

pub fn scene_mesh(scene: &SceneRegistry) -> (Vec<Vertex>, Vec<u32>) {
    let mut verts = Vec::with_capacity(scene.len() * 24);
    let mut inds = Vec::with_capacity(scene.len() * 36);

    for node in scene.nodes() {
        let (size, center) = node.kind.local_bounds();
        push_box(
            &mut verts,
            &mut inds,
            node.placement.matrix(),
            center,
            size,
            node.placement.color,
        );
    }

    (verts, inds)
}

/// Widget panels in clip space. `aspect` is width / height.
pub fn menu_mesh(ui: &UiManager, aspect: f32) -> (Vec<Vertex>, Vec<u32>) {
    let mut verts = Vec::new();
    let mut inds = Vec::new();
    if !ui.is_visible() {
        return (verts, inds);
    }

    let aspect = aspect.max(1e-3);
    let to_clip = |v: Vec2| Vec2::new(v.x / aspect, v.y);

    for (i, w) in ui.widgets().iter().enumerate() {
        let focused = ui.focus_index() == Some(i);
        let center = to_clip(w.pos);
        let half = to_clip(w.half_size());

        match (&w.kind, w.fill()) {
            (WidgetKind::Slider { .. }, Some(fill)) => {
                push_panel(&mut verts, &mut inds, center, half, if focused { FOCUSED } else { TRACK });
                let inner = half * Vec2::new(fill, 0.6);
                let left = center - Vec2::new(half.x - inner.x, 0.0);
                push_panel(&mut verts, &mut inds, left, inner, FILL);
            }
            (WidgetKind::Label, _) => push_panel(&mut verts, &mut inds, center, half, LABEL),
            _ => push_panel(&mut verts, &mut inds, center, half, if focused { FOCUSED } else { BUTTON }),
        }
    }

    (verts, inds)
}
