use filter_host::ParamValue;

/// GLSL types an effect may declare as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    Bool,
    Int,
    Uint,
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl ParamKind {
    pub fn from_glsl(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "uint" => Some(Self::Uint),
            "float" => Some(Self::Float),
            "vec2" | "float2" => Some(Self::Vec2),
            "vec3" | "float3" => Some(Self::Vec3),
            "vec4" | "float4" => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Member type inside the std140 block. Booleans are not host-shareable
    /// and are stored as `uint`.
    pub fn block_type(self) -> &'static str {
        match self {
            Self::Bool | Self::Uint => "uint",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }

    pub fn size(self) -> u32 {
        match self {
            Self::Bool | Self::Int | Self::Uint | Self::Float => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
        }
    }

    pub fn align(self) -> u32 {
        match self {
            Self::Bool | Self::Int | Self::Uint | Self::Float => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 => 16,
        }
    }

    fn accepts(self, value: &ParamValue) -> bool {
        matches!(
            (self, value),
            (Self::Bool, ParamValue::Bool(_))
                | (Self::Int, ParamValue::Int(_))
                | (Self::Uint, ParamValue::Uint(_))
                | (Self::Float, ParamValue::Float(_))
                | (Self::Vec2, ParamValue::Vec2(_))
                | (Self::Vec3, ParamValue::Vec3(_))
                | (Self::Vec4, ParamValue::Vec4(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParamSlot {
    pub name: String,
    pub kind: ParamKind,
    pub offset: u32,
}

/// std140 placement of every declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParamLayout {
    pub slots: Vec<ParamSlot>,
    pub size: u32,
}

/// Uniform blocks must not be empty; effects without parameters get one vec4.
pub(crate) const RESERVED_BLOCK_SIZE: u32 = 16;

impl ParamLayout {
    pub fn std140<'a>(params: impl IntoIterator<Item = (&'a str, ParamKind)>) -> Self {
        let mut cursor = 0u32;
        let mut slots = Vec::new();
        for (name, kind) in params {
            let offset = align_up(cursor, kind.align());
            slots.push(ParamSlot {
                name: name.to_string(),
                kind,
                offset,
            });
            cursor = offset + kind.size();
        }
        let size = align_up(cursor, 16).max(RESERVED_BLOCK_SIZE);
        Self { slots, size }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }
}

fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum ParamWriteError {
    #[error("parameter index {0} out of range")]
    OutOfRange(usize),
    #[error("parameter '{name}' is declared as {expected:?}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamKind,
        actual: &'static str,
    },
}

/// CPU copy of an effect's parameter block, uploaded before each draw.
#[derive(Debug, Clone)]
pub(crate) struct ParamBlock {
    layout: ParamLayout,
    bytes: Vec<u8>,
}

impl ParamBlock {
    pub fn new(layout: ParamLayout) -> Self {
        let bytes = vec![0u8; layout.size as usize];
        Self { layout, bytes }
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn write(&mut self, index: usize, value: ParamValue) -> Result<(), ParamWriteError> {
        let slot = self
            .layout
            .slots
            .get(index)
            .ok_or(ParamWriteError::OutOfRange(index))?;
        if !slot.kind.accepts(&value) {
            return Err(ParamWriteError::TypeMismatch {
                name: slot.name.clone(),
                expected: slot.kind,
                actual: value.type_name(),
            });
        }

        let offset = slot.offset as usize;
        match value {
            ParamValue::Bool(v) => self.put(offset, bytemuck::bytes_of(&u32::from(v))),
            ParamValue::Int(v) => self.put(offset, bytemuck::bytes_of(&v)),
            ParamValue::Uint(v) => self.put(offset, bytemuck::bytes_of(&v)),
            ParamValue::Float(v) => self.put(offset, bytemuck::bytes_of(&v)),
            ParamValue::Vec2(v) => self.put(offset, bytemuck::cast_slice(&v)),
            ParamValue::Vec3(v) => self.put(offset, bytemuck::cast_slice(&v)),
            ParamValue::Vec4(v) => self.put(offset, bytemuck::cast_slice(&v)),
        }
        Ok(())
    }

    fn put(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lays_out_mirror_parameters() {
        let layout =
            ParamLayout::std140([("switchLeftToRight", ParamKind::Bool), ("pixel_size", ParamKind::Vec2)]);
        assert_eq!(layout.slots[0].offset, 0);
        assert_eq!(layout.slots[1].offset, 8);
        assert_eq!(layout.size, 16);
    }

    #[test]
    fn packs_scalar_after_vec3() {
        let layout = ParamLayout::std140([
            ("a", ParamKind::Float),
            ("b", ParamKind::Vec3),
            ("c", ParamKind::Float),
            ("d", ParamKind::Vec4),
        ]);
        let offsets: Vec<u32> = layout.slots.iter().map(|slot| slot.offset).collect();
        assert_eq!(offsets, vec![0, 16, 28, 32]);
        assert_eq!(layout.size, 48);
    }

    #[test]
    fn empty_layout_reserves_one_vec4() {
        let layout = ParamLayout::std140(std::iter::empty());
        assert!(layout.slots.is_empty());
        assert_eq!(layout.size, RESERVED_BLOCK_SIZE);
    }

    #[test]
    fn writes_bool_as_uint_and_vec2_as_floats() {
        let layout =
            ParamLayout::std140([("switchLeftToRight", ParamKind::Bool), ("pixel_size", ParamKind::Vec2)]);
        let mut block = ParamBlock::new(layout);

        block.write(0, ParamValue::Bool(true)).unwrap();
        block.write(1, ParamValue::Vec2([0.5, 0.25])).unwrap();

        assert_eq!(&block.bytes()[0..4], &1u32.to_ne_bytes());
        assert_eq!(&block.bytes()[8..12], &0.5f32.to_ne_bytes());
        assert_eq!(&block.bytes()[12..16], &0.25f32.to_ne_bytes());
    }

    #[test]
    fn rejects_mismatched_and_out_of_range_writes() {
        let layout = ParamLayout::std140([("pixel_size", ParamKind::Vec2)]);
        let mut block = ParamBlock::new(layout);

        assert!(matches!(
            block.write(0, ParamValue::Bool(true)),
            Err(ParamWriteError::TypeMismatch { .. })
        ));
        assert_eq!(
            block.write(3, ParamValue::Float(1.0)),
            Err(ParamWriteError::OutOfRange(3))
        );
        assert!(block.bytes().iter().all(|byte| *byte == 0));
    }
}
