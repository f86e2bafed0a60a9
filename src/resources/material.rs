//! 材质定义
//!
//! glTF metallic-roughness materials plus the extensions this viewer honours
//! (unlit, emissive strength, IOR, specular-glossiness, clearcoat, sheen and
//! the specular override).
//! [`Material::finalize`] derives the feature-flag list, the property map and
//! the ordered texture list the renderer consumes; nothing here touches the GPU.

use std::collections::BTreeMap;

use glam::{Mat3, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::resources::shader_defines::ShaderDefines;
use crate::resources::uniforms::UniformValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Texture slots of a material, in the order their defines and properties
/// are emitted. The core slots come first, then the extension slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextureSlot {
    Normal,
    Occlusion,
    Emissive,
    BaseColor,
    MetallicRoughness,
    // KHR_materials_pbrSpecularGlossiness
    Diffuse,
    SpecularGlossiness,
    // KHR_materials_clearcoat
    Clearcoat,
    ClearcoatRoughness,
    ClearcoatNormal,
    // KHR_materials_sheen
    SheenColorIntensity,
    // KHR_materials_specular
    Specular,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 12] = [
        TextureSlot::Normal,
        TextureSlot::Occlusion,
        TextureSlot::Emissive,
        TextureSlot::BaseColor,
        TextureSlot::MetallicRoughness,
        TextureSlot::Diffuse,
        TextureSlot::SpecularGlossiness,
        TextureSlot::Clearcoat,
        TextureSlot::ClearcoatRoughness,
        TextureSlot::ClearcoatNormal,
        TextureSlot::SheenColorIntensity,
        TextureSlot::Specular,
    ];

    #[must_use]
    pub const fn sampler_name(self) -> &'static str {
        match self {
            Self::Normal => "u_NormalSampler",
            Self::Occlusion => "u_OcclusionSampler",
            Self::Emissive => "u_EmissiveSampler",
            Self::BaseColor => "u_BaseColorSampler",
            Self::MetallicRoughness => "u_MetallicRoughnessSampler",
            Self::Diffuse => "u_DiffuseSampler",
            Self::SpecularGlossiness => "u_SpecularGlossinessSampler",
            Self::Clearcoat => "u_ClearcoatSampler",
            Self::ClearcoatRoughness => "u_ClearcoatRoughnessSampler",
            Self::ClearcoatNormal => "u_ClearcoatNormalSampler",
            Self::SheenColorIntensity => "u_SheenColorIntensitySampler",
            Self::Specular => "u_MetallicRoughnessSpecularSampler",
        }
    }

    #[must_use]
    pub const fn map_define(self) -> &'static str {
        match self {
            Self::Normal => "HAS_NORMAL_MAP",
            Self::Occlusion => "HAS_OCCLUSION_MAP",
            Self::Emissive => "HAS_EMISSIVE_MAP",
            Self::BaseColor => "HAS_BASE_COLOR_MAP",
            Self::MetallicRoughness => "HAS_METALLIC_ROUGHNESS_MAP",
            Self::Diffuse => "HAS_DIFFUSE_MAP",
            Self::SpecularGlossiness => "HAS_SPECULAR_GLOSSINESS_MAP",
            Self::Clearcoat => "HAS_CLEARCOAT_TEXTURE_MAP",
            Self::ClearcoatRoughness => "HAS_CLEARCOAT_ROUGHNESS_MAP",
            Self::ClearcoatNormal => "HAS_CLEARCOAT_NORMAL_MAP",
            Self::SheenColorIntensity => "HAS_SHEEN_COLOR_INTENSITY_MAP",
            Self::Specular => "HAS_METALLICROUGHNESS_SPECULAROVERRIDE_MAP",
        }
    }

    #[must_use]
    pub const fn uv_transform_define(self) -> &'static str {
        match self {
            Self::Normal => "HAS_NORMAL_UV_TRANSFORM",
            Self::Occlusion => "HAS_OCCLUSION_UV_TRANSFORM",
            Self::Emissive => "HAS_EMISSIVE_UV_TRANSFORM",
            Self::BaseColor => "HAS_BASECOLOR_UV_TRANSFORM",
            Self::MetallicRoughness => "HAS_METALLICROUGHNESS_UV_TRANSFORM",
            Self::Diffuse => "HAS_DIFFUSE_UV_TRANSFORM",
            Self::SpecularGlossiness => "HAS_SPECULARGLOSSINESS_UV_TRANSFORM",
            Self::Clearcoat => "HAS_CLEARCOAT_UV_TRANSFORM",
            Self::ClearcoatRoughness => "HAS_CLEARCOATROUGHNESS_UV_TRANSFORM",
            Self::ClearcoatNormal => "HAS_CLEARCOATNORMAL_UV_TRANSFORM",
            Self::SheenColorIntensity => "HAS_SHEENCOLORINTENSITY_UV_TRANSFORM",
            Self::Specular => "HAS_METALLICROUGHNESSSPECULAR_UV_TRANSFORM",
        }
    }

    /// Color textures are stored in sRGB and decoded on sampling.
    #[must_use]
    pub const fn is_srgb(self) -> bool {
        matches!(
            self,
            Self::BaseColor | Self::Emissive | Self::Diffuse | Self::SpecularGlossiness | Self::SheenColorIntensity
        )
    }
}

/// `KHR_texture_transform` parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    /// Overrides the texture info's UV set when present.
    pub tex_coord: Option<u32>,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            tex_coord: None,
        }
    }
}

impl TextureTransform {
    /// `T · R · S`; the extension's rotation turns UVs clockwise.
    #[must_use]
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_translation(self.offset)
            * Mat3::from_angle(-self.rotation)
            * Mat3::from_scale(self.scale)
    }
}

/// Reference from a material slot to a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub texture: usize,
    pub tex_coord: u32,
    /// Normal scale or occlusion strength; `1.0` for the other slots.
    pub scale: f32,
    pub transform: Option<TextureTransform>,
}

impl TextureInfo {
    #[must_use]
    pub fn new(texture: usize, tex_coord: u32) -> Self {
        Self {
            texture,
            tex_coord,
            scale: 1.0,
            transform: None,
        }
    }

    /// UV set after `KHR_texture_transform` overrides.
    #[must_use]
    pub fn uv_set(&self) -> u32 {
        self.transform
            .and_then(|t| t.tex_coord)
            .unwrap_or(self.tex_coord)
    }
}

/// Enumerated material uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaterialProperty {
    BaseColorFactor,
    MetallicFactor,
    RoughnessFactor,
    EmissiveFactor,
    NormalScale,
    OcclusionStrength,
    AlphaCutoff,
    Ior,
    DiffuseFactor,
    SpecularFactor,
    GlossinessFactor,
    ClearcoatFactor,
    ClearcoatRoughnessFactor,
    ClearcoatNormalScale,
    SheenColorFactor,
    SheenIntensityFactor,
    SheenRoughness,
    SpecularOverrideFactor,
    UvSet(TextureSlot),
    UvTransform(TextureSlot),
}

impl MaterialProperty {
    /// Name of the uniform this property feeds.
    #[must_use]
    pub const fn uniform_name(self) -> &'static str {
        match self {
            Self::BaseColorFactor => "u_BaseColorFactor",
            Self::MetallicFactor => "u_MetallicFactor",
            Self::RoughnessFactor => "u_RoughnessFactor",
            Self::EmissiveFactor => "u_EmissiveFactor",
            Self::NormalScale => "u_NormalScale",
            Self::OcclusionStrength => "u_OcclusionStrength",
            Self::AlphaCutoff => "u_AlphaCutoff",
            Self::Ior => "u_IOR",
            Self::DiffuseFactor => "u_DiffuseFactor",
            Self::SpecularFactor => "u_SpecularFactor",
            Self::GlossinessFactor => "u_GlossinessFactor",
            Self::ClearcoatFactor => "u_ClearcoatFactor",
            Self::ClearcoatRoughnessFactor => "u_ClearcoatRoughnessFactor",
            Self::ClearcoatNormalScale => "u_ClearcoatNormalScale",
            Self::SheenColorFactor => "u_SheenColorFactor",
            Self::SheenIntensityFactor => "u_SheenIntensityFactor",
            Self::SheenRoughness => "u_SheenRoughness",
            Self::SpecularOverrideFactor => "u_MetallicRoughnessSpecularFactor",
            Self::UvSet(slot) => match slot {
                TextureSlot::Normal => "u_NormalUVSet",
                TextureSlot::Occlusion => "u_OcclusionUVSet",
                TextureSlot::Emissive => "u_EmissiveUVSet",
                TextureSlot::BaseColor => "u_BaseColorUVSet",
                TextureSlot::MetallicRoughness => "u_MetallicRoughnessUVSet",
                TextureSlot::Diffuse => "u_DiffuseUVSet",
                TextureSlot::SpecularGlossiness => "u_SpecularGlossinessUVSet",
                TextureSlot::Clearcoat => "u_ClearcoatUVSet",
                TextureSlot::ClearcoatRoughness => "u_ClearcoatRoughnessUVSet",
                TextureSlot::ClearcoatNormal => "u_ClearcoatNormalUVSet",
                TextureSlot::SheenColorIntensity => "u_SheenColorIntensityUVSet",
                TextureSlot::Specular => "u_MetallicRoughnessSpecularUVSet",
            },
            Self::UvTransform(slot) => match slot {
                TextureSlot::Normal => "u_NormalUVTransform",
                TextureSlot::Occlusion => "u_OcclusionUVTransform",
                TextureSlot::Emissive => "u_EmissiveUVTransform",
                TextureSlot::BaseColor => "u_BaseColorUVTransform",
                TextureSlot::MetallicRoughness => "u_MetallicRoughnessUVTransform",
                TextureSlot::Diffuse => "u_DiffuseUVTransform",
                TextureSlot::SpecularGlossiness => "u_SpecularGlossinessUVTransform",
                TextureSlot::Clearcoat => "u_ClearcoatUVTransform",
                TextureSlot::ClearcoatRoughness => "u_ClearcoatRoughnessUVTransform",
                TextureSlot::ClearcoatNormal => "u_ClearcoatNormalUVTransform",
                TextureSlot::SheenColorIntensity => "u_SheenColorIntensityUVTransform",
                TextureSlot::Specular => "u_MetallicRoughnessSpecularUVTransform",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,

    // === 因子 ===
    /// `None` when the material has no `pbrMetallicRoughness` block.
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub emissive_factor: Vec3,
    /// `KHR_materials_emissive_strength`
    pub emissive_strength: f32,
    /// `KHR_materials_ior`
    pub ior: Option<f32>,
    /// `KHR_materials_unlit`
    pub unlit: bool,
    /// `KHR_materials_pbrSpecularGlossiness`; replaces the metallic-roughness model.
    pub specular_glossiness: Option<PbrSpecularGlossiness>,
    /// `KHR_materials_clearcoat`
    pub clearcoat: Option<Clearcoat>,
    /// `KHR_materials_sheen`
    pub sheen: Option<Sheen>,
    /// `KHR_materials_specular`
    pub specular: Option<SpecularOverride>,

    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,

    // === 纹理 ===
    pub normal_texture: Option<TextureInfo>,
    pub occlusion_texture: Option<TextureInfo>,
    pub emissive_texture: Option<TextureInfo>,

    // === 派生数据 (finalize) ===
    defines: ShaderDefines,
    properties: BTreeMap<MaterialProperty, UniformValue>,
    textures: Vec<(TextureSlot, TextureInfo)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            base_color_texture: None,
            metallic_roughness_texture: None,
        }
    }
}

/// `KHR_materials_pbrSpecularGlossiness` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrSpecularGlossiness {
    pub diffuse_factor: Vec4,
    pub specular_factor: Vec3,
    pub glossiness_factor: f32,
    pub diffuse_texture: Option<TextureInfo>,
    /// RGB specular color, glossiness in alpha.
    pub specular_glossiness_texture: Option<TextureInfo>,
}

impl Default for PbrSpecularGlossiness {
    fn default() -> Self {
        Self {
            diffuse_factor: Vec4::ONE,
            specular_factor: Vec3::ONE,
            glossiness_factor: 1.0,
            diffuse_texture: None,
            specular_glossiness_texture: None,
        }
    }
}

/// `KHR_materials_clearcoat` parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clearcoat {
    pub factor: f32,
    pub roughness_factor: f32,
    /// Layer intensity in the red channel.
    pub texture: Option<TextureInfo>,
    /// Layer roughness in the green channel.
    pub roughness_texture: Option<TextureInfo>,
    pub normal_texture: Option<TextureInfo>,
}

/// `KHR_materials_sheen` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheen {
    pub color_factor: Vec3,
    pub intensity_factor: f32,
    pub roughness_factor: f32,
    /// Sheen color in RGB, intensity in alpha.
    pub color_intensity_texture: Option<TextureInfo>,
}

impl Default for Sheen {
    fn default() -> Self {
        Self {
            color_factor: Vec3::ONE,
            intensity_factor: 0.0,
            roughness_factor: 0.0,
            color_intensity_texture: None,
        }
    }
}

/// `KHR_materials_specular` parameters. Scales the dielectric reflectance
/// of a metallic-roughness material; `0.5` leaves it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecularOverride {
    pub specular_factor: f32,
    /// Specular strength in the alpha channel.
    pub specular_texture: Option<TextureInfo>,
}

impl Default for SpecularOverride {
    fn default() -> Self {
        Self {
            specular_factor: 0.5,
            specular_texture: None,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr_metallic_roughness: None,
            emissive_factor: Vec3::ZERO,
            emissive_strength: 1.0,
            ior: None,
            unlit: false,
            specular_glossiness: None,
            clearcoat: None,
            sheen: None,
            specular: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            defines: ShaderDefines::new(),
            properties: BTreeMap::new(),
            textures: Vec::new(),
        }
    }
}

impl Material {
    /// The material used by primitives that reference none.
    ///
    /// Its derived data is ready without calling [`Material::finalize`].
    #[must_use]
    pub fn default_material() -> Self {
        let mut material = Self {
            name: Some("Default Material".to_string()),
            ..Self::default()
        };
        material.defines.enable("MATERIAL_METALLICROUGHNESS");
        material
            .properties
            .insert(MaterialProperty::BaseColorFactor, UniformValue::Vec4(Vec4::ONE));
        material
            .properties
            .insert(MaterialProperty::MetallicFactor, UniformValue::Float(1.0));
        material
            .properties
            .insert(MaterialProperty::RoughnessFactor, UniformValue::Float(1.0));
        material
    }

    /// Template the fragment stage of this material is generated from.
    #[must_use]
    pub fn shader_identifier(&self) -> &'static str {
        "pbr.frag"
    }

    #[must_use]
    pub fn texture_info(&self, slot: TextureSlot) -> Option<&TextureInfo> {
        match slot {
            TextureSlot::Normal => self.normal_texture.as_ref(),
            TextureSlot::Occlusion => self.occlusion_texture.as_ref(),
            TextureSlot::Emissive => self.emissive_texture.as_ref(),
            TextureSlot::BaseColor => self
                .pbr_metallic_roughness
                .as_ref()
                .and_then(|pbr| pbr.base_color_texture.as_ref()),
            TextureSlot::MetallicRoughness => self
                .pbr_metallic_roughness
                .as_ref()
                .and_then(|pbr| pbr.metallic_roughness_texture.as_ref()),
            TextureSlot::Diffuse => self
                .specular_glossiness
                .as_ref()
                .and_then(|sg| sg.diffuse_texture.as_ref()),
            TextureSlot::SpecularGlossiness => self
                .specular_glossiness
                .as_ref()
                .and_then(|sg| sg.specular_glossiness_texture.as_ref()),
            TextureSlot::Clearcoat => self.clearcoat.as_ref().and_then(|cc| cc.texture.as_ref()),
            TextureSlot::ClearcoatRoughness => self
                .clearcoat
                .as_ref()
                .and_then(|cc| cc.roughness_texture.as_ref()),
            TextureSlot::ClearcoatNormal => self.clearcoat.as_ref().and_then(|cc| cc.normal_texture.as_ref()),
            TextureSlot::SheenColorIntensity => self
                .sheen
                .as_ref()
                .and_then(|sheen| sheen.color_intensity_texture.as_ref()),
            TextureSlot::Specular => self
                .specular
                .as_ref()
                .and_then(|specular| specular.specular_texture.as_ref()),
        }
    }

    /// Derives defines, properties and the texture list from the authored fields.
    ///
    /// Calling it again rebuilds the derived data from scratch.
    pub fn finalize(&mut self) {
        let mut defines = ShaderDefines::new();
        let mut properties = BTreeMap::new();
        let mut textures = Vec::new();

        for slot in TextureSlot::ALL {
            if slot == TextureSlot::Emissive {
                properties.insert(
                    MaterialProperty::EmissiveFactor,
                    UniformValue::Vec3(self.emissive_factor * self.emissive_strength),
                );
            }

            let Some(info) = self.texture_info(slot).cloned() else {
                continue;
            };

            if let Some(transform) = info.transform {
                defines.enable(slot.uv_transform_define());
                properties.insert(
                    MaterialProperty::UvTransform(slot),
                    UniformValue::Mat3(transform.matrix()),
                );
            }

            defines.enable(slot.map_define());
            match slot {
                TextureSlot::Normal => {
                    properties.insert(MaterialProperty::NormalScale, UniformValue::Float(info.scale));
                }
                TextureSlot::Occlusion => {
                    properties.insert(
                        MaterialProperty::OcclusionStrength,
                        UniformValue::Float(info.scale),
                    );
                }
                TextureSlot::ClearcoatNormal => {
                    properties.insert(
                        MaterialProperty::ClearcoatNormalScale,
                        UniformValue::Float(info.scale),
                    );
                }
                _ => {}
            }
            properties.insert(
                MaterialProperty::UvSet(slot),
                UniformValue::Int(info.uv_set() as i32),
            );
            textures.push((slot, info));
        }

        match self.alpha_mode {
            AlphaMode::Mask => {
                defines.enable("ALPHAMODE_MASK");
                properties.insert(MaterialProperty::AlphaCutoff, UniformValue::Float(self.alpha_cutoff));
            }
            AlphaMode::Opaque => defines.enable("ALPHAMODE_OPAQUE"),
            AlphaMode::Blend => {}
        }

        // 高光-光泽度模型取代金属-粗糙度模型
        if let Some(sg) = &self.specular_glossiness {
            defines.enable("MATERIAL_SPECULARGLOSSINESS");
            properties.insert(MaterialProperty::DiffuseFactor, UniformValue::Vec4(sg.diffuse_factor));
            properties.insert(MaterialProperty::SpecularFactor, UniformValue::Vec3(sg.specular_factor));
            properties.insert(
                MaterialProperty::GlossinessFactor,
                UniformValue::Float(sg.glossiness_factor),
            );
        } else if let Some(pbr) = &self.pbr_metallic_roughness {
            defines.enable("MATERIAL_METALLICROUGHNESS");
            properties.insert(
                MaterialProperty::BaseColorFactor,
                UniformValue::Vec4(pbr.base_color_factor),
            );
            properties.insert(
                MaterialProperty::MetallicFactor,
                UniformValue::Float(pbr.metallic_factor),
            );
            properties.insert(
                MaterialProperty::RoughnessFactor,
                UniformValue::Float(pbr.roughness_factor),
            );
        }

        if self.unlit {
            defines.enable("MATERIAL_UNLIT");
        }

        if let Some(ior) = self.ior {
            defines.enable("MATERIAL_IOR");
            properties.insert(MaterialProperty::Ior, UniformValue::Float(ior));
        }

        if let Some(clearcoat) = &self.clearcoat {
            defines.enable("MATERIAL_CLEARCOAT");
            properties.insert(MaterialProperty::ClearcoatFactor, UniformValue::Float(clearcoat.factor));
            properties.insert(
                MaterialProperty::ClearcoatRoughnessFactor,
                UniformValue::Float(clearcoat.roughness_factor),
            );
            properties
                .entry(MaterialProperty::ClearcoatNormalScale)
                .or_insert(UniformValue::Float(1.0));
        }

        if let Some(sheen) = &self.sheen {
            defines.enable("MATERIAL_SHEEN");
            properties.insert(MaterialProperty::SheenColorFactor, UniformValue::Vec3(sheen.color_factor));
            properties.insert(
                MaterialProperty::SheenIntensityFactor,
                UniformValue::Float(sheen.intensity_factor),
            );
            properties.insert(MaterialProperty::SheenRoughness, UniformValue::Float(sheen.roughness_factor));
        }

        // Only meaningful on top of the metallic-roughness model.
        if let Some(specular) = &self.specular
            && self.specular_glossiness.is_none()
        {
            defines.enable("MATERIAL_METALLICROUGHNESS_SPECULAROVERRIDE");
            properties.insert(
                MaterialProperty::SpecularOverrideFactor,
                UniformValue::Float(specular.specular_factor),
            );
        }

        self.defines = defines;
        self.properties = properties;
        self.textures = textures;
    }

    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    #[must_use]
    pub fn properties(&self) -> &BTreeMap<MaterialProperty, UniformValue> {
        &self.properties
    }

    /// Textures in binding order, paired with their slot.
    #[must_use]
    pub fn textures(&self) -> &[(TextureSlot, TextureInfo)] {
        &self.textures
    }

    /// Clears extension texture references that point past the document's
    /// texture array. Core slots are checked when the material is read.
    pub fn drop_dangling_textures(&mut self, texture_count: usize) {
        let mut slots: Vec<&mut Option<TextureInfo>> = Vec::new();
        if let Some(sg) = &mut self.specular_glossiness {
            slots.push(&mut sg.diffuse_texture);
            slots.push(&mut sg.specular_glossiness_texture);
        }
        if let Some(cc) = &mut self.clearcoat {
            slots.push(&mut cc.texture);
            slots.push(&mut cc.roughness_texture);
            slots.push(&mut cc.normal_texture);
        }
        if let Some(sheen) = &mut self.sheen {
            slots.push(&mut sheen.color_intensity_texture);
        }
        if let Some(specular) = &mut self.specular {
            slots.push(&mut specular.specular_texture);
        }
        for slot in slots {
            if slot.as_ref().is_some_and(|info| info.texture >= texture_count) {
                log::warn!("Material {:?}: extension texture out of range, ignoring it", self.name);
                *slot = None;
            }
        }
    }

    #[must_use]
    pub fn is_blended(&self) -> bool {
        self.alpha_mode == AlphaMode::Blend
    }
}

// ============================================================================
// 扩展处理器 (Material extension handlers)
// ============================================================================

/// Applies one glTF material extension to a material under construction.
///
/// Handlers are looked up by extension name, so adding support for another
/// extension means registering one more handler.
pub trait MaterialExtensionHandler {
    fn name(&self) -> &'static str;

    fn apply(&self, material: &mut Material, value: &serde_json::Value);
}

/// `KHR_materials_unlit`
pub struct UnlitHandler;

impl MaterialExtensionHandler for UnlitHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_unlit"
    }

    fn apply(&self, material: &mut Material, _value: &serde_json::Value) {
        material.unlit = true;
    }
}

/// `KHR_materials_emissive_strength`
pub struct EmissiveStrengthHandler;

impl MaterialExtensionHandler for EmissiveStrengthHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_emissive_strength"
    }

    fn apply(&self, material: &mut Material, value: &serde_json::Value) {
        if let Some(strength) = value.get("emissiveStrength").and_then(serde_json::Value::as_f64) {
            material.emissive_strength = strength as f32;
        }
    }
}

/// `KHR_materials_ior`
pub struct IorHandler;

impl MaterialExtensionHandler for IorHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_ior"
    }

    fn apply(&self, material: &mut Material, value: &serde_json::Value) {
        let ior = value.get("ior").and_then(serde_json::Value::as_f64).unwrap_or(1.5);
        material.ior = Some(ior as f32);
    }
}

fn json_f32(value: &serde_json::Value, key: &str) -> Option<f32> {
    value.get(key).and_then(serde_json::Value::as_f64).map(|v| v as f32)
}

fn json_floats<const N: usize>(value: &serde_json::Value, key: &str) -> Option<[f32; N]> {
    let array = value.get(key)?.as_array()?;
    if array.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(array) {
        *slot = item.as_f64()? as f32;
    }
    Some(out)
}

/// Parses a `textureInfo` object carried inside an extension, including
/// its own `KHR_texture_transform`.
fn json_texture_info(value: &serde_json::Value, key: &str) -> Option<TextureInfo> {
    let info = value.get(key)?;
    let texture = info.get("index").and_then(serde_json::Value::as_u64)?;
    let tex_coord = info.get("texCoord").and_then(serde_json::Value::as_u64).unwrap_or(0);
    let mut result = TextureInfo::new(texture as usize, tex_coord as u32);
    if let Some(scale) = json_f32(info, "scale") {
        result.scale = scale;
    }
    if let Some(transform) = info.get("extensions").and_then(|ext| ext.get("KHR_texture_transform")) {
        let defaults = TextureTransform::default();
        result.transform = Some(TextureTransform {
            offset: json_floats(transform, "offset").map_or(defaults.offset, Vec2::from_array),
            rotation: json_f32(transform, "rotation").unwrap_or(defaults.rotation),
            scale: json_floats(transform, "scale").map_or(defaults.scale, Vec2::from_array),
            tex_coord: transform
                .get("texCoord")
                .and_then(serde_json::Value::as_u64)
                .map(|set| set as u32),
        });
    }
    Some(result)
}

/// `KHR_materials_pbrSpecularGlossiness`
pub struct PbrSpecularGlossinessHandler;

impl MaterialExtensionHandler for PbrSpecularGlossinessHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_pbrSpecularGlossiness"
    }

    fn apply(&self, material: &mut Material, value: &serde_json::Value) {
        let defaults = PbrSpecularGlossiness::default();
        material.specular_glossiness = Some(PbrSpecularGlossiness {
            diffuse_factor: json_floats(value, "diffuseFactor").map_or(defaults.diffuse_factor, Vec4::from_array),
            specular_factor: json_floats(value, "specularFactor").map_or(defaults.specular_factor, Vec3::from_array),
            glossiness_factor: json_f32(value, "glossinessFactor").unwrap_or(defaults.glossiness_factor),
            diffuse_texture: json_texture_info(value, "diffuseTexture"),
            specular_glossiness_texture: json_texture_info(value, "specularGlossinessTexture"),
        });
    }
}

/// `KHR_materials_clearcoat`
pub struct ClearcoatHandler;

impl MaterialExtensionHandler for ClearcoatHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_clearcoat"
    }

    fn apply(&self, material: &mut Material, value: &serde_json::Value) {
        material.clearcoat = Some(Clearcoat {
            factor: json_f32(value, "clearcoatFactor").unwrap_or(0.0),
            roughness_factor: json_f32(value, "clearcoatRoughnessFactor").unwrap_or(0.0),
            texture: json_texture_info(value, "clearcoatTexture"),
            roughness_texture: json_texture_info(value, "clearcoatRoughnessTexture"),
            normal_texture: json_texture_info(value, "clearcoatNormalTexture"),
        });
    }
}

/// `KHR_materials_sheen`
///
/// Accepts both the draft parameter names (`intensityFactor`, `colorFactor`,
/// `colorIntensityTexture`) and the ratified ones (`sheenColorFactor`,
/// `sheenRoughnessFactor`, `sheenColorTexture`). The ratified form has no
/// intensity parameter, so its intensity is fixed at `1.0`.
pub struct SheenHandler;

impl MaterialExtensionHandler for SheenHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_sheen"
    }

    fn apply(&self, material: &mut Material, value: &serde_json::Value) {
        let ratified = ["sheenColorFactor", "sheenRoughnessFactor", "sheenColorTexture"]
            .iter()
            .any(|key| value.get(key).is_some());

        let sheen = if ratified {
            Sheen {
                color_factor: json_floats(value, "sheenColorFactor").map_or(Vec3::ZERO, Vec3::from_array),
                intensity_factor: 1.0,
                roughness_factor: json_f32(value, "sheenRoughnessFactor").unwrap_or(0.0),
                color_intensity_texture: json_texture_info(value, "sheenColorTexture"),
            }
        } else {
            let defaults = Sheen::default();
            Sheen {
                color_factor: json_floats(value, "colorFactor").map_or(defaults.color_factor, Vec3::from_array),
                intensity_factor: json_f32(value, "intensityFactor").unwrap_or(defaults.intensity_factor),
                roughness_factor: json_f32(value, "roughnessFactor").unwrap_or(defaults.roughness_factor),
                color_intensity_texture: json_texture_info(value, "colorIntensityTexture"),
            }
        };
        material.sheen = Some(sheen);
    }
}

/// `KHR_materials_specular`
pub struct SpecularHandler;

impl MaterialExtensionHandler for SpecularHandler {
    fn name(&self) -> &'static str {
        "KHR_materials_specular"
    }

    fn apply(&self, material: &mut Material, value: &serde_json::Value) {
        let defaults = SpecularOverride::default();
        material.specular = Some(SpecularOverride {
            specular_factor: json_f32(value, "specularFactor").unwrap_or(defaults.specular_factor),
            specular_texture: json_texture_info(value, "specularTexture"),
        });
    }
}

/// Registered material extension handlers keyed by extension name.
pub struct MaterialExtensions {
    handlers: FxHashMap<&'static str, Box<dyn MaterialExtensionHandler>>,
}

impl Default for MaterialExtensions {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(UnlitHandler));
        registry.register(Box::new(EmissiveStrengthHandler));
        registry.register(Box::new(IorHandler));
        registry.register(Box::new(PbrSpecularGlossinessHandler));
        registry.register(Box::new(ClearcoatHandler));
        registry.register(Box::new(SheenHandler));
        registry.register(Box::new(SpecularHandler));
        registry
    }
}

impl MaterialExtensions {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, handler: Box<dyn MaterialExtensionHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    #[must_use]
    pub fn supports(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Runs the handler of every extension present on the material.
    /// Unknown extensions are ignored.
    pub fn apply_all(&self, material: &mut Material, extensions: &serde_json::Map<String, serde_json::Value>) {
        for (name, value) in extensions {
            match self.handlers.get(name.as_str()) {
                Some(handler) => handler.apply(material, value),
                None => log::debug!("No handler for material extension {name}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(material: &Material) -> Vec<String> {
        material.defines().flag_strings().collect()
    }

    #[test]
    fn default_material_is_metallic_roughness() {
        let material = Material::default_material();
        assert_eq!(flags(&material), ["MATERIAL_METALLICROUGHNESS 1"]);
        assert_eq!(
            material.properties().get(&MaterialProperty::BaseColorFactor),
            Some(&UniformValue::Vec4(Vec4::ONE))
        );
        assert!(!material.is_blended());
    }

    #[test]
    fn finalize_emits_flags_in_slot_order() {
        let mut material = Material {
            pbr_metallic_roughness: Some(PbrMetallicRoughness {
                base_color_texture: Some(TextureInfo::new(0, 0)),
                ..PbrMetallicRoughness::default()
            }),
            normal_texture: Some(TextureInfo {
                scale: 0.5,
                ..TextureInfo::new(1, 1)
            }),
            alpha_mode: AlphaMode::Mask,
            unlit: true,
            ..Material::default()
        };
        material.finalize();

        assert_eq!(
            flags(&material),
            [
                "HAS_NORMAL_MAP 1",
                "HAS_BASE_COLOR_MAP 1",
                "ALPHAMODE_MASK 1",
                "MATERIAL_METALLICROUGHNESS 1",
                "MATERIAL_UNLIT 1",
            ]
        );
        let props = material.properties();
        assert_eq!(props.get(&MaterialProperty::NormalScale), Some(&UniformValue::Float(0.5)));
        assert_eq!(
            props.get(&MaterialProperty::UvSet(TextureSlot::Normal)),
            Some(&UniformValue::Int(1))
        );
        assert_eq!(props.get(&MaterialProperty::AlphaCutoff), Some(&UniformValue::Float(0.5)));
        assert_eq!(material.textures().len(), 2);
        assert_eq!(material.textures()[0].0, TextureSlot::Normal);
    }

    #[test]
    fn texture_transform_overrides_uv_set() {
        let mut material = Material {
            emissive_texture: Some(TextureInfo {
                transform: Some(TextureTransform {
                    offset: Vec2::new(0.5, 0.0),
                    tex_coord: Some(1),
                    ..TextureTransform::default()
                }),
                ..TextureInfo::new(0, 0)
            }),
            ..Material::default()
        };
        material.finalize();

        assert!(material.defines().contains("HAS_EMISSIVE_UV_TRANSFORM"));
        assert_eq!(
            material
                .properties()
                .get(&MaterialProperty::UvSet(TextureSlot::Emissive)),
            Some(&UniformValue::Int(1))
        );
        let Some(UniformValue::Mat3(m)) = material
            .properties()
            .get(&MaterialProperty::UvTransform(TextureSlot::Emissive))
        else {
            panic!("missing uv transform");
        };
        assert_eq!(m.transform_point2(Vec2::ZERO), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn blend_mode_emits_no_alpha_flag() {
        let mut material = Material {
            alpha_mode: AlphaMode::Blend,
            ..Material::default()
        };
        material.finalize();
        assert!(material.is_blended());
        assert!(!material.defines().contains("ALPHAMODE_OPAQUE"));
        assert!(!material.defines().contains("ALPHAMODE_MASK"));
    }
    #[test]
    fn extension_handlers_update_material() {
        let registry = MaterialExtensions::default();
        let extensions: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
            r#"{
                "KHR_materials_unlit": {},
                "KHR_materials_emissive_strength": { "emissiveStrength": 4.0 },
                "KHR_materials_ior": {},
                "EXT_unknown": { "x": 1 }
            }"#,
        )
        .unwrap();

        let mut material = Material {
            emissive_factor: Vec3::ONE,
            ..Material::default()
        };
        registry.apply_all(&mut material, &extensions);
        material.finalize();

        assert!(material.unlit);
        assert_eq!(material.ior, Some(1.5));
        assert!(material.defines().contains("MATERIAL_UNLIT"));
        assert!(material.defines().contains("MATERIAL_IOR"));
        assert_eq!(
            material.properties().get(&MaterialProperty::EmissiveFactor),
            Some(&UniformValue::Vec3(Vec3::splat(4.0)))
        );
        assert!(!registry.supports("EXT_unknown"));
    }

    fn apply_json(json: &str) -> Material {
        let extensions: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).unwrap();
        let mut material = Material {
            pbr_metallic_roughness: Some(PbrMetallicRoughness::default()),
            ..Material::default()
        };
        MaterialExtensions::default().apply_all(&mut material, &extensions);
        material.finalize();
        material
    }

    #[test]
    fn specular_glossiness_replaces_metallic_roughness() {
        let material = apply_json(
            r#"{
                "KHR_materials_pbrSpecularGlossiness": {
                    "diffuseFactor": [0.5, 0.5, 0.5, 1.0],
                    "specularFactor": [0.2, 0.3, 0.4],
                    "glossinessFactor": 0.25,
                    "diffuseTexture": { "index": 0 },
                    "specularGlossinessTexture": {
                        "index": 1,
                        "texCoord": 1,
                        "extensions": { "KHR_texture_transform": { "scale": [2.0, 2.0] } }
                    }
                }
            }"#,
        );

        let defines = material.defines();
        assert!(defines.contains("MATERIAL_SPECULARGLOSSINESS"));
        assert!(!defines.contains("MATERIAL_METALLICROUGHNESS"));
        assert!(defines.contains("HAS_DIFFUSE_MAP"));
        assert!(defines.contains("HAS_SPECULAR_GLOSSINESS_MAP"));
        assert!(defines.contains("HAS_SPECULARGLOSSINESS_UV_TRANSFORM"));

        let props = material.properties();
        assert_eq!(
            props.get(&MaterialProperty::DiffuseFactor),
            Some(&UniformValue::Vec4(Vec4::new(0.5, 0.5, 0.5, 1.0)))
        );
        assert_eq!(
            props.get(&MaterialProperty::SpecularFactor),
            Some(&UniformValue::Vec3(Vec3::new(0.2, 0.3, 0.4)))
        );
        assert_eq!(props.get(&MaterialProperty::GlossinessFactor), Some(&UniformValue::Float(0.25)));
        assert_eq!(
            props.get(&MaterialProperty::UvSet(TextureSlot::SpecularGlossiness)),
            Some(&UniformValue::Int(1))
        );
        assert!(props.get(&MaterialProperty::MetallicFactor).is_none());

        let slots: Vec<_> = material.textures().iter().map(|(slot, info)| (*slot, info.texture)).collect();
        assert_eq!(slots, [(TextureSlot::Diffuse, 0), (TextureSlot::SpecularGlossiness, 1)]);
        assert_eq!(TextureSlot::Diffuse.sampler_name(), "u_DiffuseSampler");
        assert!(TextureSlot::Diffuse.is_srgb());
    }

    #[test]
    fn clearcoat_binds_three_textures() {
        let material = apply_json(
            r#"{
                "KHR_materials_clearcoat": {
                    "clearcoatFactor": 1.0,
                    "clearcoatRoughnessFactor": 0.3,
                    "clearcoatTexture": { "index": 2 },
                    "clearcoatRoughnessTexture": { "index": 3 },
                    "clearcoatNormalTexture": { "index": 4, "scale": 0.5 }
                }
            }"#,
        );

        assert!(material.defines().contains("MATERIAL_CLEARCOAT"));
        assert!(material.defines().contains("MATERIAL_METALLICROUGHNESS"));
        for define in [
            "HAS_CLEARCOAT_TEXTURE_MAP",
            "HAS_CLEARCOAT_ROUGHNESS_MAP",
            "HAS_CLEARCOAT_NORMAL_MAP",
        ] {
            assert!(material.defines().contains(define), "{define}");
        }
        let props = material.properties();
        assert_eq!(props.get(&MaterialProperty::ClearcoatFactor), Some(&UniformValue::Float(1.0)));
        assert_eq!(
            props.get(&MaterialProperty::ClearcoatRoughnessFactor),
            Some(&UniformValue::Float(0.3))
        );
        assert_eq!(
            props.get(&MaterialProperty::ClearcoatNormalScale),
            Some(&UniformValue::Float(0.5))
        );
        let samplers: Vec<_> = material.textures().iter().map(|(slot, _)| slot.sampler_name()).collect();
        assert_eq!(
            samplers,
            ["u_ClearcoatSampler", "u_ClearcoatRoughnessSampler", "u_ClearcoatNormalSampler"]
        );
        assert!(!TextureSlot::ClearcoatNormal.is_srgb());
    }

    #[test]
    fn clearcoat_without_normal_map_keeps_unit_scale() {
        let material = apply_json(r#"{ "KHR_materials_clearcoat": { "clearcoatFactor": 0.5 } }"#);
        assert_eq!(
            material.properties().get(&MaterialProperty::ClearcoatNormalScale),
            Some(&UniformValue::Float(1.0))
        );
        assert!(material.textures().is_empty());
    }

    #[test]
    fn sheen_reads_both_parameter_namings() {
        let draft = apply_json(
            r#"{
                "KHR_materials_sheen": {
                    "intensityFactor": 0.8,
                    "colorFactor": [1.0, 0.0, 0.0],
                    "roughnessFactor": 0.4,
                    "colorIntensityTexture": { "index": 5 }
                }
            }"#,
        );
        assert!(draft.defines().contains("MATERIAL_SHEEN"));
        assert!(draft.defines().contains("HAS_SHEEN_COLOR_INTENSITY_MAP"));
        assert_eq!(
            draft.properties().get(&MaterialProperty::SheenIntensityFactor),
            Some(&UniformValue::Float(0.8))
        );
        assert_eq!(
            draft.properties().get(&MaterialProperty::SheenColorFactor),
            Some(&UniformValue::Vec3(Vec3::X))
        );
        assert_eq!(
            draft.properties().get(&MaterialProperty::SheenRoughness),
            Some(&UniformValue::Float(0.4))
        );

        let ratified = apply_json(
            r#"{
                "KHR_materials_sheen": {
                    "sheenColorFactor": [0.0, 1.0, 0.0],
                    "sheenRoughnessFactor": 0.6,
                    "sheenColorTexture": { "index": 1 }
                }
            }"#,
        );
        let sheen = ratified.sheen.as_ref().unwrap();
        assert_eq!(sheen.intensity_factor, 1.0);
        assert_eq!(sheen.color_factor, Vec3::Y);
        assert_eq!(sheen.roughness_factor, 0.6);
        assert_eq!(ratified.textures()[0], (TextureSlot::SheenColorIntensity, TextureInfo::new(1, 0)));
    }

    #[test]
    fn specular_override_applies_to_metallic_roughness_only() {
        let material = apply_json(
            r#"{ "KHR_materials_specular": { "specularFactor": 0.8, "specularTexture": { "index": 0 } } }"#,
        );
        assert!(material.defines().contains("MATERIAL_METALLICROUGHNESS_SPECULAROVERRIDE"));
        assert!(material.defines().contains("HAS_METALLICROUGHNESS_SPECULAROVERRIDE_MAP"));
        assert_eq!(
            material.properties().get(&MaterialProperty::SpecularOverrideFactor),
            Some(&UniformValue::Float(0.8))
        );
        assert_eq!(
            MaterialProperty::SpecularOverrideFactor.uniform_name(),
            "u_MetallicRoughnessSpecularFactor"
        );

        let combined = apply_json(
            r#"{
                "KHR_materials_specular": { "specularFactor": 0.8 },
                "KHR_materials_pbrSpecularGlossiness": {}
            }"#,
        );
        assert!(combined.defines().contains("MATERIAL_SPECULARGLOSSINESS"));
        assert!(!combined.defines().contains("MATERIAL_METALLICROUGHNESS_SPECULAROVERRIDE"));
    }

    #[test]
    fn dangling_extension_textures_are_dropped() {
        let extensions: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
            r#"{
                "KHR_materials_clearcoat": {
                    "clearcoatTexture": { "index": 0 },
                    "clearcoatNormalTexture": { "index": 7 }
                }
            }"#,
        )
        .unwrap();
        let mut material = Material::default();
        MaterialExtensions::default().apply_all(&mut material, &extensions);
        material.drop_dangling_textures(1);
        material.finalize();

        let clearcoat = material.clearcoat.as_ref().unwrap();
        assert!(clearcoat.texture.is_some());
        assert!(clearcoat.normal_texture.is_none());
        assert!(!material.defines().contains("HAS_CLEARCOAT_NORMAL_MAP"));
    }

    #[test]
    fn default_registry_covers_material_extensions() {
        let registry = MaterialExtensions::default();
        for name in [
            "KHR_materials_unlit",
            "KHR_materials_emissive_strength",
            "KHR_materials_ior",
            "KHR_materials_pbrSpecularGlossiness",
            "KHR_materials_clearcoat",
            "KHR_materials_sheen",
            "KHR_materials_specular",
        ] {
            assert!(registry.supports(name), "{name}");
        }
    }
}
