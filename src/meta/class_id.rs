//! Numeric class identifiers.

use std::fmt;
use std::str::FromStr;

use crate::util::Error;

/// Class identifier of a serialized object.
///
/// Plain integer tag. [`ClassId::UNKNOWN`] is the symbolic placeholder used
/// when the tag is not stored in the file and could not be recovered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub i32);

impl ClassId {
    pub const UNKNOWN: ClassId = ClassId(-1);
    pub const OBJECT: ClassId = ClassId(0);
    pub const GAME_OBJECT: ClassId = ClassId(1);
    pub const COMPONENT: ClassId = ClassId(2);
    pub const TRANSFORM: ClassId = ClassId(4);
    pub const CAMERA: ClassId = ClassId(20);
    pub const MATERIAL: ClassId = ClassId(21);
    pub const MESH_RENDERER: ClassId = ClassId(23);
    pub const TEXTURE_2D: ClassId = ClassId(28);
    pub const MESH_FILTER: ClassId = ClassId(33);
    pub const MESH: ClassId = ClassId(43);
    pub const SHADER: ClassId = ClassId(48);
    pub const TEXT_ASSET: ClassId = ClassId(49);
    pub const RIGIDBODY: ClassId = ClassId(54);
    pub const BOX_COLLIDER: ClassId = ClassId(65);
    pub const ANIMATION_CLIP: ClassId = ClassId(74);
    pub const AUDIO_SOURCE: ClassId = ClassId(82);
    pub const AUDIO_CLIP: ClassId = ClassId(83);
    pub const ANIMATOR: ClassId = ClassId(95);
    pub const MONO_BEHAVIOUR: ClassId = ClassId(114);
    pub const MONO_SCRIPT: ClassId = ClassId(115);
    pub const FONT: ClassId = ClassId(128);
    pub const ASSET_BUNDLE: ClassId = ClassId(142);
    pub const SKINNED_MESH_RENDERER: ClassId = ClassId(137);
    pub const RECT_TRANSFORM: ClassId = ClassId(224);
    pub const SPRITE: ClassId = ClassId(213);

    /// True for the [`ClassId::UNKNOWN`] placeholder.
    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }

    /// Human-readable name for well-known class ids.
    pub fn name(self) -> Option<&'static str> {
        CLASS_NAMES
            .binary_search_by_key(&self.0, |&(id, _)| id)
            .ok()
            .map(|i| CLASS_NAMES[i].1)
    }
}

/// Accepts a number or a well-known class name (case-insensitive).
impl FromStr for ClassId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i32>() {
            return Ok(Self(id));
        }
        CLASS_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|&(id, _)| Self(id))
            .ok_or_else(|| Error::other(format!("unknown class '{}'", s)))
    }
}

impl From<i32> for ClassId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "ClassId({} {})", self.0, name),
            None if self.is_unknown() => f.write_str("ClassId(Unknown)"),
            None => write!(f, "ClassId({})", self.0),
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_unknown() => f.write_str("Unknown"),
            None => write!(f, "Class{}", self.0),
        }
    }
}

// Sorted by id.
const CLASS_NAMES: &[(i32, &str)] = &[
    (0, "Object"),
    (1, "GameObject"),
    (2, "Component"),
    (4, "Transform"),
    (20, "Camera"),
    (21, "Material"),
    (23, "MeshRenderer"),
    (28, "Texture2D"),
    (33, "MeshFilter"),
    (43, "Mesh"),
    (48, "Shader"),
    (49, "TextAsset"),
    (54, "Rigidbody"),
    (65, "BoxCollider"),
    (74, "AnimationClip"),
    (82, "AudioSource"),
    (83, "AudioClip"),
    (95, "Animator"),
    (114, "MonoBehaviour"),
    (115, "MonoScript"),
    (128, "Font"),
    (137, "SkinnedMeshRenderer"),
    (142, "AssetBundle"),
    (213, "Sprite"),
    (224, "RectTransform"),
];
