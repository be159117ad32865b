use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Handle, Module, ScalarKind, Type, TypeInner};

use super::{ShaderError, ShaderInput, ShaderProgram, ShaderStage};

/// Compiles a vertex/fragment WGSL pair and links them into a program.
///
/// Fails with [`ShaderError::Compile`] when a stage does not parse, does not
/// validate or lacks an entry point for its stage, and with
/// [`ShaderError::Link`] when the fragment stage consumes a location the vertex
/// stage does not produce (or produces with a different type).
pub fn compile(vertex_source: &str, fragment_source: &str) -> Result<ShaderProgram, ShaderError> {
    let vertex = compile_stage(ShaderStage::Vertex, vertex_source)?;
    let fragment = compile_stage(ShaderStage::Fragment, fragment_source)?;

    link(&vertex, &fragment)?;

    let inputs = vertex
        .inputs
        .iter()
        .map(|v| ShaderInput {
            name: v.name.clone(),
            location: v.location,
            components: float_components(&v.inner),
        })
        .collect();

    log::debug!(
        "linked shader program (vertex `{}`, fragment `{}`)",
        vertex.entry,
        fragment.entry
    );

    Ok(ShaderProgram {
        vertex_source: vertex_source.to_owned(),
        fragment_source: fragment_source.to_owned(),
        vertex_entry: vertex.entry,
        fragment_entry: fragment.entry,
        inputs,
    })
}

/// One user-defined (`@location`) value crossing a stage boundary.
#[derive(Debug)]
struct Varying {
    name: String,
    location: u32,
    inner: TypeInner,
}

#[derive(Debug)]
struct CompiledStage {
    entry: String,
    inputs: Vec<Varying>,
    outputs: Vec<Varying>,
    has_result: bool,
}

fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;

    let Some(ep) = module.entry_points.iter().find(|ep| ep.stage == stage.to_naga()) else {
        return Err(ShaderError::Compile {
            stage,
            log: format!("no @{stage} entry point found"),
        });
    };

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_varyings(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_varyings(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    Ok(CompiledStage {
        entry: ep.name.clone(),
        inputs,
        outputs,
        has_result: ep.function.result.is_some(),
    })
}

/// Flattens an entry-point argument or result into its located members.
/// Builtins are skipped; unbound structs are walked member by member.
fn collect_varyings(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or_default().to_owned(),
            location: *location,
            inner: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_varyings(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<(), ShaderError> {
    let mut problems = Vec::new();

    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|o| o.location == input.location) {
            None => problems.push(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )),
            Some(output) if output.inner != input.inner => problems.push(format!(
                "fragment input `{}` at location {} does not match the type of vertex output `{}`",
                input.name, input.location, output.name
            )),
            Some(_) => {}
        }
    }

    if !fragment.has_result {
        problems.push(format!("fragment entry point `{}` writes no color output", fragment.entry));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ShaderError::Link { log: problems.join("\n") })
    }
}

fn float_components(inner: &TypeInner) -> Option<u8> {
    match *inner {
        TypeInner::Scalar(s) if s.kind == ScalarKind::Float && s.width == 4 => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
            Some(size as u8)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{RECT_SHADOW_FRAGMENT, RECT_SHADOW_VERTEX};

    const TINT_VS: &str = r#"
struct TintOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) tint: vec4<f32>,
};

@vertex
fn vs_main(@location(0) a_position: vec2<f32>) -> TintOut {
    var o: TintOut;
    o.pos = vec4<f32>(a_position, 0.0, 1.0);
    o.tint = vec4<f32>(1.0, 0.0, 0.0, 1.0);
    return o;
}
"#;

    const TINT_FS: &str = r#"
@fragment
fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;

    #[test]
    fn builtin_pair_compiles() {
        let program = compile(RECT_SHADOW_VERTEX, RECT_SHADOW_FRAGMENT).expect("built-in shaders link");
        assert_eq!(program.vertex_entry(), "vs_main");
        assert_eq!(program.fragment_entry(), "fs_main");
    }

    #[test]
    fn builtin_inputs_are_reflected_by_name() {
        let program = compile(RECT_SHADOW_VERTEX, RECT_SHADOW_FRAGMENT).unwrap();
        let names: Vec<_> = program.inputs().iter().map(|i| (i.name.as_str(), i.location, i.components)).collect();
        assert_eq!(
            names,
            vec![
                ("a_position", 0, Some(2)),
                ("v_box", 1, Some(4)),
                ("v_color", 2, Some(4)),
                ("v_corner", 3, Some(4)),
                ("v_window", 4, Some(2)),
                ("v_sigma", 5, Some(1)),
            ]
        );
        assert_eq!(program.attribute_location("v_sigma"), Some(5));
        assert_eq!(program.attribute_location("v_missing"), None);
    }

    #[test]
    fn argument_inputs_are_reflected() {
        let program = compile(TINT_VS, TINT_FS).unwrap();
        assert_eq!(program.attribute_location("a_position"), Some(0));
        assert_eq!(program.inputs().len(), 1);
    }

    #[test]
    fn vertex_syntax_error_reports_stage_and_log() {
        let err = compile("#version 330 cor\nvoid main() {", TINT_FS).unwrap_err();
        let ShaderError::Compile { stage, log } = &err else { panic!("expected compile error, got {err:?}") };
        assert_eq!(*stage, ShaderStage::Vertex);
        assert!(!log.is_empty());
        assert!(err.to_string().contains(log.as_str()));
    }

    #[test]
    fn fragment_syntax_error_reports_fragment_stage() {
        let err = compile(TINT_VS, "@fragment fn fs_main( {").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn missing_entry_point_is_a_compile_error() {
        let err = compile(TINT_FS, TINT_FS).unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("@vertex"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unmatched_fragment_location_fails_to_link() {
        let fs = TINT_FS.replace("@location(0) tint", "@location(7) tint");
        let err = compile(TINT_VS, &fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(err.log().contains("location 7"));
        assert!(err.to_string().contains(err.log()));
    }

    #[test]
    fn fragment_without_color_output_fails_to_link() {
        let fs = r#"
@fragment
fn fs_main(@location(0) tint: vec4<f32>) {
    _ = tint;
}
"#;
        let err = compile(TINT_VS, fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(err.log().contains("writes no color output"));
    }

    #[test]
    fn mismatched_varying_type_fails_to_link() {
        let fs = r#"
@fragment
fn fs_main(@location(0) tint: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(tint, 0.0, 1.0);
}
"#;
        let err = compile(TINT_VS, fs).unwrap_err();
        assert!(err.log().contains("does not match"));
    }
}
