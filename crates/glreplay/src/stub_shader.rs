//! Deterministic stand-in shaders for programs whose source text was not captured.
//!
//! Only post-link reflection is available for such programs, and it does not say which stage
//! references which uniform. The generated vertex and fragment stubs therefore both declare and
//! read every uniform they legally can, so that after relinking each uniform is still active and
//! keeps a location. Reads are folded into the stage output scaled by a negligible constant.
//!
//! Output is compared byte-for-byte downstream: declarations are sorted by name, deduplicated, and
//! the text is built with explicit `\n` only.

use std::collections::BTreeSet;

use glreplay_extras::gl::{SamplerKind, ScalarKind, TypeShape, UniformType};
use glreplay_extras::ActiveUniform;
use thiserror::Error;

use crate::error::ErrorKind;

const ACCUMULATOR_SCALE: &str = "0.000001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubShaders {
    pub vertex: String,
    pub fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StubError {
    #[error("uniform name {0:?} cannot be declared as a plain GLSL uniform")]
    UnsupportedName(String),
    #[error("uniform {0:?} reports an array size of zero")]
    UnsupportedArraySize(String),
}

impl StubError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Unsupported
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration<'a> {
    name: &'a str,
    ty: UniformType,
    array: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn accepts(self, ty: UniformType) -> bool {
        match self {
            Self::Vertex => !is_external(ty),
            Self::Fragment => true,
        }
    }
}

/// Names of the locals the stubs introduce, chosen to avoid every uniform name.
struct Locals {
    sum: String,
    color: String,
}

impl Locals {
    fn avoiding(declarations: &[Declaration<'_>]) -> Self {
        let taken: BTreeSet<&str> = declarations.iter().map(|decl| decl.name).collect();
        let fresh = |base: &str| {
            let mut name = base.to_owned();
            while taken.contains(name.as_str()) {
                name.push('_');
            }
            name
        };
        Self {
            sum: fresh("stub_sum"),
            color: fresh("stub_color"),
        }
    }

    fn output(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => "gl_Position",
            Stage::Fragment => &self.color,
        }
    }
}

/// Builds a vertex and a fragment stub that keep every uniform in `uniforms` active.
///
/// The result depends only on the set of uniforms, not on their order.
pub fn synthesize_stub_shaders(uniforms: &[ActiveUniform]) -> Result<StubShaders, StubError> {
    let mut declarations = uniforms
        .iter()
        .map(declaration)
        .collect::<Result<Vec<_>, _>>()?;
    // Per name, keep the declaration covering the most elements.
    declarations.sort_by(|a, b| {
        a.name
            .cmp(b.name)
            .then_with(|| b.array.cmp(&a.array))
            .then_with(|| a.ty.cmp(&b.ty))
    });
    declarations.dedup_by(|later, first| later.name == first.name);

    let locals = Locals::avoiding(&declarations);
    Ok(StubShaders {
        vertex: emit(Stage::Vertex, &declarations, &locals),
        fragment: emit(Stage::Fragment, &declarations, &locals),
    })
}

fn declaration(uniform: &ActiveUniform) -> Result<Declaration<'_>, StubError> {
    let name = uniform
        .name
        .strip_suffix("[0]")
        .unwrap_or(&uniform.name);
    if !is_identifier(name) || name.starts_with("gl_") {
        return Err(StubError::UnsupportedName(uniform.name.clone()));
    }
    let array = match uniform.array_size {
        0 => return Err(StubError::UnsupportedArraySize(uniform.name.clone())),
        1 => None,
        n => Some(n),
    };
    Ok(Declaration {
        name,
        ty: uniform.ty,
        array,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_external(ty: UniformType) -> bool {
    matches!(
        ty.shape(),
        TypeShape::Sampler(SamplerKind { external: true, .. })
    )
}

/// Sampler types GLSL ES 3.00 gives a default precision in every stage.
fn has_default_precision(ty: UniformType) -> bool {
    matches!(
        ty,
        UniformType::Sampler2d | UniformType::SamplerCube | UniformType::SamplerExternalOes
    )
}

fn emit(stage: Stage, declarations: &[Declaration<'_>], locals: &Locals) -> String {
    let declarations: Vec<&Declaration<'_>> = declarations
        .iter()
        .filter(|decl| stage.accepts(decl.ty))
        .collect();

    let mut out = String::new();
    out.push_str("#version 300 es\n");
    if declarations.iter().any(|decl| is_external(decl.ty)) {
        out.push_str("#extension GL_OES_EGL_image_external_essl3 : require\n");
    }
    out.push_str("precision highp float;\n");
    out.push_str("precision highp int;\n");
    let sampler_precisions: BTreeSet<&str> = declarations
        .iter()
        .filter(|decl| decl.ty.is_sampler() && !has_default_precision(decl.ty))
        .map(|decl| decl.ty.glsl_name())
        .collect();
    for sampler in sampler_precisions {
        out.push_str(&format!("precision highp {sampler};\n"));
    }
    out.push('\n');

    if !declarations.is_empty() {
        for decl in &declarations {
            let ty = decl.ty.glsl_name();
            let name = decl.name;
            match decl.array {
                Some(len) => out.push_str(&format!("uniform {ty} {name}[{len}];\n")),
                None => out.push_str(&format!("uniform {ty} {name};\n")),
            }
        }
        out.push('\n');
    }

    let sum = &locals.sum;
    if stage == Stage::Fragment {
        out.push_str(&format!("out vec4 {};\n\n", locals.color));
    }

    out.push_str("void main() {\n");
    out.push_str(&format!("    float {sum} = 0.0;\n"));
    for decl in &declarations {
        match decl.array {
            Some(len) => {
                for i in 0..len {
                    let term = read_term(decl.ty, &format!("{}[{i}]", decl.name));
                    out.push_str(&format!("    {sum} += {term};\n"));
                }
            }
            None => {
                let term = read_term(decl.ty, decl.name);
                out.push_str(&format!("    {sum} += {term};\n"));
            }
        }
    }
    out.push_str(&format!(
        "    {} = vec4({sum} * {ACCUMULATOR_SCALE}, 0.0, 0.0, 1.0);\n",
        locals.output(stage)
    ));
    out.push_str("}\n");
    out
}

/// Expression reading one component of `var` as a `float`.
fn read_term(ty: UniformType, var: &str) -> String {
    match ty.shape() {
        TypeShape::Scalar(ScalarKind::Float) => var.to_owned(),
        TypeShape::Scalar(_) => format!("float({var})"),
        TypeShape::Vector(ScalarKind::Float, _) => format!("{var}.x"),
        TypeShape::Vector(..) => format!("float({var}.x)"),
        TypeShape::Matrix { .. } => format!("{var}[0][0]"),
        TypeShape::Sampler(sampler) => {
            // Shadow lookups take the depth reference as an extra coordinate and return a float.
            let coords = sampler.coord_components + u8::from(sampler.shadow);
            let fetch = format!("texture({var}, vec{coords}(0.0))");
            match (sampler.shadow, sampler.result) {
                (true, _) => fetch,
                (false, ScalarKind::Float) => format!("{fetch}.x"),
                (false, _) => format!("float({fetch}.x)"),
            }
        }
    }
}
