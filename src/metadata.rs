use std::{borrow::Cow, num::NonZeroU64};

use serde::{Deserialize, Serialize};
use zarrs::{
    array::{
        ArrayMetadataV3, FillValueMetadata,
        chunk_grid::{RegularChunkGrid, RegularChunkGridConfiguration},
        codec::{BytesCodec, GzipCodec},
        data_type,
    },
    metadata::v3::MetadataV3,
    plugin::{ExtensionAliasesV3, ZarrVersion},
};
use zarrs_codec::{CodecMetadataOptions, CodecTraits};

use crate::{dims::Shape, pixel::PixelKind};

/// Gzip compression level for each chunk; 0 disables compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Compression(u8);

impl Compression {
    pub const NONE: Self = Self(0);
    pub const MAX_LEVEL: u32 = 9;

    pub fn new(level: u32) -> crate::Result<Self> {
        if level > Self::MAX_LEVEL {
            return Err(crate::Error::InvalidCompression(level));
        }
        Ok(Self(level as u8))
    }

    pub fn level(self) -> u32 {
        self.0 as u32
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u32> for Compression {
    type Error = crate::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Compression> for u32 {
    fn from(value: Compression) -> Self {
        value.level()
    }
}

/// One entry of ilastik's `axistags` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTag {
    pub key: String,
    /// 1 channel, 2 space, 8 time.
    pub type_flags: u32,
    pub resolution: f64,
    pub description: String,
}

impl AxisTag {
    fn new(key: &str, type_flags: u32) -> Self {
        Self {
            key: key.to_string(),
            type_flags,
            resolution: 0.0,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTags {
    pub axes: Vec<AxisTag>,
}

impl AxisTags {
    /// Tags for the exported `(t, x, y, z, c)` order.
    pub fn txyzc() -> Self {
        Self {
            axes: vec![
                AxisTag::new("t", 8),
                AxisTag::new("x", 2),
                AxisTag::new("y", 2),
                AxisTag::new("z", 2),
                AxisTag::new("c", 1),
            ],
        }
    }
}

pub const DIMENSION_ORDER: &str = "txyzc";

/// Everything needed to create one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetLayout {
    pub name: String,
    pub kind: PixelKind,
    /// Initial extent; grown later with [crate::storage::Dataset::set_extent].
    pub shape: Shape,
    pub chunk_shape: Shape,
    pub compression: Compression,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl DatasetLayout {
    pub fn new(
        name: impl Into<String>,
        kind: PixelKind,
        shape: Shape,
        chunk_shape: Shape,
        compression: Compression,
    ) -> crate::Result<Self> {
        let name = name.into();
        if name.trim_matches('/').is_empty() {
            return Err(crate::Error::general("dataset name must not be empty"));
        }
        if chunk_shape.contains(&0) {
            return Err(crate::Error::InvalidDimensions(format!(
                "zero extent in chunk shape {chunk_shape:?}"
            )));
        }
        Ok(Self {
            name,
            kind,
            shape,
            chunk_shape,
            compression,
            attributes: default_attributes()?,
        })
    }

    /// Absolute node path of the array inside the hierarchy.
    pub fn node_path(&self) -> String {
        format!("/{}", self.name.trim_matches('/'))
    }

    /// Same layout with a different extent.
    pub fn with_shape(&self, shape: Shape) -> Self {
        Self {
            shape,
            ..self.clone()
        }
    }
}

fn default_attributes() -> crate::Result<serde_json::Map<String, serde_json::Value>> {
    let mut attributes = serde_json::Map::new();
    // ilastik reads axistags as a JSON string, not a nested object
    let tags = serde_json::to_string(&AxisTags::txyzc())?;
    attributes.insert("axistags".into(), serde_json::Value::String(tags));
    attributes.insert(
        "dimension_order".into(),
        serde_json::Value::String(DIMENSION_ORDER.into()),
    );
    Ok(attributes)
}

fn convert_chunk_grid(chunk_shape: &[u64]) -> crate::Result<MetadataV3> {
    let chunk_shape: Vec<_> = chunk_shape
        .iter()
        .map(|&n| NonZeroU64::new(n).ok_or_else(|| crate::Error::general("zero chunk size")))
        .collect::<crate::Result<Vec<_>>>()?;
    let out = MetadataV3::new_with_serializable_configuration(
        RegularChunkGrid::aliases_v3().default_name.clone().to_string(),
        &RegularChunkGridConfiguration { chunk_shape },
    )?;
    Ok(out)
}

fn convert_data_type(kind: PixelKind) -> MetadataV3 {
    let data_type = match kind {
        PixelKind::U8 => data_type::uint8(),
        PixelKind::U16 => data_type::uint16(),
        PixelKind::U32 => data_type::uint32(),
        PixelKind::F32 => data_type::float32(),
    };
    let data_type_name = data_type
        .name_v3()
        .map_or_else(|| kind.zarr_data_type().to_string(), Cow::into_owned);
    let data_type_configuration = data_type.configuration_v3();
    if data_type_configuration.is_empty() {
        MetadataV3::new(data_type_name)
    } else {
        MetadataV3::new_with_configuration(data_type_name, data_type_configuration)
    }
}

fn convert_codec(codec: &impl CodecTraits) -> crate::Result<MetadataV3> {
    let zarr_version = ZarrVersion::V3;
    let name = codec
        .name(zarr_version)
        .ok_or_else(|| crate::Error::general("codec has no zarr v3 name"))?;
    let out = if let Some(config) =
        codec.configuration(zarr_version, &CodecMetadataOptions::default())
    {
        MetadataV3::new_with_configuration(name, config)
    } else {
        MetadataV3::new(name)
    };
    Ok(out)
}

/// Little-endian bytes, then gzip unless compression is off.
fn convert_codecs(compression: Compression) -> crate::Result<Vec<MetadataV3>> {
    let mut codecs = vec![convert_codec(&BytesCodec::little())?];
    if !compression.is_none() {
        let gzip = GzipCodec::new(compression.level()).map_err(crate::Error::wrap)?;
        codecs.push(convert_codec(&gzip)?);
    }
    Ok(codecs)
}

fn convert_fill_value() -> FillValueMetadata {
    FillValueMetadata::Number(serde_json::Number::from(0))
}

impl TryFrom<&DatasetLayout> for ArrayMetadataV3 {
    type Error = crate::Error;

    fn try_from(value: &DatasetLayout) -> Result<Self, Self::Error> {
        let chunk_grid = convert_chunk_grid(&value.chunk_shape)?;
        let data_type = convert_data_type(value.kind);
        let codecs = convert_codecs(value.compression)?;
        let out = Self::new(
            value.shape.to_vec(),
            chunk_grid,
            data_type,
            convert_fill_value(),
            codecs,
        )
        .with_attributes(value.attributes.clone());
        Ok(out)
    }
}
