//! 着色器管线模块
//!
//! - cache: 着色器变体缓存 + 程序缓存 (ShaderCache)
//! - shader_gen: 变体哈希与源码生成
//! - shader_manager: 模板环境、内嵌 WGSL 源与 include 解析
//! - reflection: 基于 naga 的程序反射

pub mod cache;
pub mod reflection;
pub mod shader_gen;
pub mod shader_manager;

pub use cache::{CompiledShader, GpuProgram, ShaderCache};
pub use reflection::{AttributeInfo, ProgramReflection, SamplerInfo, UniformInfo};
pub use shader_gen::ShaderGenerator;
