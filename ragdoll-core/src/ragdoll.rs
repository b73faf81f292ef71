//! Paper-doll body plan: ten rectangular parts pinned together.

use glam::Vec2;
use serde::Serialize;

use crate::error::WorldError;
use crate::world::{BodyId, PartDesc, PhysicsWorld, PinJoint, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PartKind {
    Head,
    Torso,
    LeftUpperArm,
    LeftLowerArm,
    RightUpperArm,
    RightLowerArm,
    LeftUpperLeg,
    LeftLowerLeg,
    RightUpperLeg,
    RightLowerLeg,
}

impl PartKind {
    pub fn name(self) -> &'static str {
        match self {
            PartKind::Head => "head",
            PartKind::Torso => "torso",
            PartKind::LeftUpperArm => "left_upper_arm",
            PartKind::LeftLowerArm => "left_lower_arm",
            PartKind::RightUpperArm => "right_upper_arm",
            PartKind::RightLowerArm => "right_lower_arm",
            PartKind::LeftUpperLeg => "left_upper_leg",
            PartKind::LeftLowerLeg => "left_lower_leg",
            PartKind::RightUpperLeg => "right_upper_leg",
            PartKind::RightLowerLeg => "right_lower_leg",
        }
    }
}

/// Part layout relative to the torso centre, in px at scale 1.
struct PartPlan {
    kind: PartKind,
    offset: (f32, f32),
    size: (f32, f32),
}

const PARTS: [PartPlan; 10] = [
    PartPlan {
        kind: PartKind::Head,
        offset: (0.0, -84.0),
        size: (44.0, 44.0),
    },
    PartPlan {
        kind: PartKind::Torso,
        offset: (0.0, 0.0),
        size: (60.0, 120.0),
    },
    PartPlan {
        kind: PartKind::LeftUpperArm,
        offset: (-40.0, -25.0),
        size: (18.0, 64.0),
    },
    PartPlan {
        kind: PartKind::LeftLowerArm,
        offset: (-40.0, 39.0),
        size: (16.0, 64.0),
    },
    PartPlan {
        kind: PartKind::RightUpperArm,
        offset: (40.0, -25.0),
        size: (18.0, 64.0),
    },
    PartPlan {
        kind: PartKind::RightLowerArm,
        offset: (40.0, 39.0),
        size: (16.0, 64.0),
    },
    PartPlan {
        kind: PartKind::LeftUpperLeg,
        offset: (-16.0, 95.0),
        size: (24.0, 70.0),
    },
    PartPlan {
        kind: PartKind::LeftLowerLeg,
        offset: (-16.0, 165.0),
        size: (22.0, 70.0),
    },
    PartPlan {
        kind: PartKind::RightUpperLeg,
        offset: (16.0, 95.0),
        size: (24.0, 70.0),
    },
    PartPlan {
        kind: PartKind::RightLowerLeg,
        offset: (16.0, 165.0),
        size: (22.0, 70.0),
    },
];

/// Joints as (name, parent, child, pivot relative to the torso centre).
const JOINTS: [(&str, PartKind, PartKind, (f32, f32)); 9] = [
    ("neck", PartKind::Torso, PartKind::Head, (0.0, -62.0)),
    ("left_shoulder", PartKind::Torso, PartKind::LeftUpperArm, (-40.0, -55.0)),
    ("left_elbow", PartKind::LeftUpperArm, PartKind::LeftLowerArm, (-40.0, 7.0)),
    ("right_shoulder", PartKind::Torso, PartKind::RightUpperArm, (40.0, -55.0)),
    ("right_elbow", PartKind::RightUpperArm, PartKind::RightLowerArm, (40.0, 7.0)),
    ("left_hip", PartKind::Torso, PartKind::LeftUpperLeg, (-16.0, 60.0)),
    ("left_knee", PartKind::LeftUpperLeg, PartKind::LeftLowerLeg, (-16.0, 130.0)),
    ("right_hip", PartKind::Torso, PartKind::RightUpperLeg, (16.0, 60.0)),
    ("right_knee", PartKind::RightUpperLeg, PartKind::RightLowerLeg, (16.0, 130.0)),
];

#[derive(Clone, Debug, PartialEq)]
pub struct RagdollPart {
    pub kind: PartKind,
    pub body: BodyId,
    pub size: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RagdollJoint {
    pub name: &'static str,
    pub joint: PinJoint,
}

/// Material and size settings for [`Ragdoll::assemble`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RagdollOptions {
    pub scale: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub joint_stiffness: f32,
}

impl Default for RagdollOptions {
    fn default() -> Self {
        RagdollOptions {
            scale: 1.0,
            density: 0.002,
            friction: 0.6,
            restitution: 0.1,
            joint_stiffness: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ragdoll {
    parts: Vec<RagdollPart>,
    joints: Vec<RagdollJoint>,
}

impl Ragdoll {
    /// Builds the doll with its torso centred on `origin`.
    pub fn assemble<W: PhysicsWorld>(
        world: &mut W,
        origin: Vec2,
        opts: &RagdollOptions,
    ) -> Result<Self, WorldError> {
        let s = opts.scale;
        let mut parts = Vec::with_capacity(PARTS.len());
        for plan in &PARTS {
            let size = Vec2::new(plan.size.0, plan.size.1) * s;
            let center = origin + Vec2::new(plan.offset.0, plan.offset.1) * s;
            let body = world.add_part(&PartDesc {
                rect: Rect::new(center, size),
                density: opts.density,
                friction: opts.friction,
                restitution: opts.restitution,
            })?;
            parts.push(RagdollPart {
                kind: plan.kind,
                body,
                size,
            });
        }

        let mut joints = Vec::with_capacity(JOINTS.len());
        for &(name, parent, child, pivot) in &JOINTS {
            let pivot = Vec2::new(pivot.0, pivot.1) * s;
            let joint = PinJoint {
                body_a: body_of(&parts, parent)?,
                body_b: body_of(&parts, child)?,
                anchor_a: pivot - offset_of(parent) * s,
                anchor_b: pivot - offset_of(child) * s,
                stiffness: opts.joint_stiffness,
            };
            world.add_pin_joint(&joint)?;
            joints.push(RagdollJoint { name, joint });
        }
        log::info!(
            "assembled ragdoll: {} parts, {} joints at ({:.0}, {:.0})",
            parts.len(),
            joints.len(),
            origin.x,
            origin.y
        );
        Ok(Ragdoll { parts, joints })
    }

    pub fn parts(&self) -> &[RagdollPart] {
        &self.parts
    }

    pub fn joints(&self) -> &[RagdollJoint] {
        &self.joints
    }

    /// Body ids of every part subject to landing and repositioning.
    pub fn trackable(&self) -> Vec<BodyId> {
        self.parts.iter().map(|p| p.body).collect()
    }

    pub fn part(&self, kind: PartKind) -> Option<&RagdollPart> {
        self.parts.iter().find(|p| p.kind == kind)
    }
}

fn offset_of(kind: PartKind) -> Vec2 {
    PARTS
        .iter()
        .find(|p| p.kind == kind)
        .map(|p| Vec2::new(p.offset.0, p.offset.1))
        .unwrap_or(Vec2::ZERO)
}

fn body_of(parts: &[RagdollPart], kind: PartKind) -> Result<BodyId, WorldError> {
    parts
        .iter()
        .find(|p| p.kind == kind)
        .map(|p| p.body)
        .ok_or_else(|| WorldError::InvalidShape(format!("no {} part to pin", kind.name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWorld;
    use crate::world::rotate;

    #[test]
    fn builds_ten_parts_and_nine_joints() {
        let mut world = MockWorld::new();
        let doll =
            Ragdoll::assemble(&mut world, Vec2::new(400.0, 300.0), &RagdollOptions::default())
                .unwrap();
        assert_eq!(doll.parts().len(), 10);
        assert_eq!(doll.joints().len(), 9);
        assert_eq!(world.joints.len(), 9);
        assert_eq!(doll.trackable().len(), 10);
        for p in doll.parts() {
            assert!(!world.body_state(p.body).unwrap().is_static, "{}", p.kind.name());
        }
        let torso = doll.part(PartKind::Torso).unwrap();
        assert_eq!(
            world.body_state(torso.body).unwrap().position,
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn joint_anchors_meet_at_the_pivot() {
        let mut world = MockWorld::new();
        let doll = Ragdoll::assemble(&mut world, Vec2::new(200.0, 150.0), &RagdollOptions {
            scale: 1.5,
            ..RagdollOptions::default()
        })
        .unwrap();
        for j in doll.joints() {
            let a = world.body_state(j.joint.body_a).unwrap();
            let b = world.body_state(j.joint.body_b).unwrap();
            let wa = a.position + rotate(j.joint.anchor_a, a.angle);
            let wb = b.position + rotate(j.joint.anchor_b, b.angle);
            assert!((wa - wb).length() < 1e-3, "{} pivots apart: {wa} vs {wb}", j.name);
        }
    }

    #[test]
    fn scale_grows_every_part() {
        let mut world = MockWorld::new();
        let doll = Ragdoll::assemble(&mut world, Vec2::ZERO, &RagdollOptions {
            scale: 2.0,
            ..RagdollOptions::default()
        })
        .unwrap();
        let head = doll.part(PartKind::Head).unwrap();
        assert_eq!(head.size, Vec2::new(88.0, 88.0));
    }
}
