use lucix_core::config::{BackendOptLevel, CompileMode, Config};
use lucix_core::jit::{ExecutionPipeline, SharedBuffer};
use lucix_core::script::Script;
use lucix_core::{LucixErrorExt, compile_script};

struct Run {
    output: String,
    diagnostics: String,
    results: Vec<i32>,
    pipeline: ExecutionPipeline,
}

fn run_with(src: &str, config: Config) -> Result<Run, Box<dyn LucixErrorExt>> {
    let diagnostics = SharedBuffer::new();
    let output = SharedBuffer::new();
    let mut pipeline = ExecutionPipeline::with_writers(
        &config,
        Box::new(diagnostics.clone()),
        Box::new(output.clone()),
    )
    .expect("pipeline");
    compile_script(&Script::from_source("t.lx", src), &config, &mut pipeline)?;
    Ok(Run {
        output: output.contents(),
        diagnostics: diagnostics.contents(),
        results: pipeline.results().to_vec(),
        pipeline,
    })
}

fn run(src: &str) -> Run {
    run_with(src, Config::default()).expect("script should compile and run")
}

/// Every script is checked with and without the IR optimizer.
fn both_ways(src: &str) -> Vec<i32> {
    let optimized = run(src).results;
    let plain = run_with(
        src,
        Config {
            optimize: false,
            backend_opt_level: BackendOptLevel::None,
            ..Config::default()
        },
    )
    .expect("unoptimized run")
    .results;
    assert_eq!(optimized, plain, "optimizer changed the result of:\n{}", src);
    optimized
}

#[test]
fn call_across_units_prints_five() {
    let run = run("fn add(a i32, b i32) i32 { return a + b; } fn test() i32 { return add(2, 3); }");
    assert_eq!(run.output, "5\n");
    assert!(run.diagnostics.contains("; unit 'add'"));
    assert!(run.diagnostics.contains("; unit 'test'"));
}

#[test]
fn branch_on_comparison_prints_one() {
    let src = "fn test() i32 { var x i32 = 4; if x > 3 { x = x - 3; } else { x = 0; } return x; }";
    assert_eq!(both_ways(src), vec![1]);
}

#[test]
fn comparisons_yield_zero_or_one() {
    assert_eq!(both_ways("fn test() i32 { return 2 < 3; }"), vec![1]);
    assert_eq!(both_ways("fn test() i32 { return 2 > 3; }"), vec![0]);
    assert_eq!(both_ways("fn test() i32 { return (5 > 1) + (7 > 2); }"), vec![2]);
}

#[test]
fn negation_and_wrapping_arithmetic() {
    assert_eq!(both_ways("fn test() i32 { return -(3 - 10); }"), vec![7]);
    assert_eq!(
        both_ways("fn test() i32 { var m i32 = 2147483647; return m + 1; }"),
        vec![i32::MIN]
    );
}

#[test]
fn shadowed_variables_keep_separate_storage() {
    let src = "fn test() i32 { var x i32 = 1; { var x i32 = 10; x = x + 1; } return x - -1; }";
    assert_eq!(both_ways(src), vec![2]);
}

#[test]
fn nested_calls_and_parameters() {
    let src = "fn sub(a i32, b i32) i32 { return a - b; } \
               fn twice(v i32) i32 { return v + v; } \
               fn test() i32 { return sub(twice(5), sub(4, 1)); }";
    assert_eq!(both_ways(src), vec![7]);
}

#[test]
fn void_function_can_be_called_for_effect() {
    let src = "fn noop(a i32) { var b i32 = a; } fn test() i32 { noop(3); return 9; }";
    assert_eq!(both_ways(src), vec![9]);
}

#[test]
fn return_inside_both_arms() {
    let src = "fn sign(v i32) i32 { if v < 0 { return -1; } else { return 1; } } \
               fn test() i32 { return sign(-5) + sign(5) + sign(0); }";
    assert_eq!(both_ways(src), vec![1]);
}

#[test]
fn per_unit_mode_runs_once_at_the_end() {
    let run = run_with(
        "fn add(a i32, b i32) i32 { return a + b; } fn test() i32 { return add(2, 3); }",
        Config {
            mode: CompileMode::PerUnit,
            ..Config::default()
        },
    )
    .expect("run");
    assert_eq!(run.results, vec![5]);
    assert!(run.diagnostics.contains("; unit 't'"));
    assert!(!run.diagnostics.contains("declare"));
}

#[test]
fn custom_entry_point_and_no_ir_dump() {
    let run = run_with(
        "fn test() i32 { return 1; } fn main() i32 { return 42; }",
        Config {
            entry_point: "main".into(),
            print_ir: false,
            ..Config::default()
        },
    )
    .expect("run");
    assert_eq!(run.output, "42\n");
    assert!(run.diagnostics.is_empty());
}

#[test]
fn script_without_entry_point_runs_nothing() {
    let run = run("fn helper() i32 { return 3; }");
    assert!(run.output.is_empty());
    assert!(run.results.is_empty());
}

#[test]
fn compiled_functions_can_be_looked_up_and_called() {
    let run = run("fn add(a i32, b i32) i32 { return a + b; }");
    let code = run.pipeline.lookup("add").expect("add is compiled");
    let add: extern "C" fn(i32, i32) -> i32 = unsafe { std::mem::transmute(code) };
    assert_eq!(add(40, 2), 42);
    assert!(run.pipeline.lookup("missing").is_err());
}

#[test]
fn build_mode_compiles_without_invoking() {
    let config = Config::default();
    let output = SharedBuffer::new();
    let mut pipeline = ExecutionPipeline::with_writers(
        &config,
        Box::new(SharedBuffer::new()),
        Box::new(output.clone()),
    )
    .expect("pipeline")
    .invoke_entry(false);
    compile_script(
        &Script::from_source("t.lx", "fn test() i32 { return 1 + 1; }"),
        &config,
        &mut pipeline,
    )
    .expect("compile");
    assert!(output.contents().is_empty());
    assert_eq!(pipeline.compiled().len(), 1);
    assert_eq!(pipeline.compiled()[0].signature, "i32 @test()");
    assert!(pipeline.compiled()[0].ops_after < pipeline.compiled()[0].ops_before);
}

#[test]
fn optimized_ir_dump_is_optional() {
    let diagnostics = SharedBuffer::new();
    let config = Config::default();
    let mut pipeline = ExecutionPipeline::with_writers(
        &config,
        Box::new(diagnostics.clone()),
        Box::new(SharedBuffer::new()),
    )
    .expect("pipeline")
    .print_optimized(true);
    compile_script(
        &Script::from_source("t.lx", "fn test() i32 { var x i32 = 2; return x + 3; }"),
        &config,
        &mut pipeline,
    )
    .expect("compile");
    let text = diagnostics.contents();
    let (generated, optimized) = text.split_once("; optimized").expect("optimized dump");
    assert!(generated.contains("alloca"));
    assert!(!optimized.contains("alloca"));
    assert!(!optimized.contains("load"));
}

#[test]
fn lowering_error_stops_before_entry_point() {
    let err = run_with(
        "fn test() i32 { return nope; }",
        Config::default(),
    )
    .err()
    .expect("unresolved symbol");
    assert_eq!(err.message(), "cannot resolve symbol nope");
}

#[test]
fn constant_sum_prints_five() {
    assert_eq!(run("fn test() i32 { return 2 + 3; }").output, "5\n");
}

#[test]
fn early_return_in_then_arm_prints_one() {
    let src = "fn test() i32 { var x i32 = 10; if x > 0 { return 1; } return 0; }";
    assert_eq!(run(src).output, "1\n");
    assert_eq!(both_ways(src), vec![1]);
}

#[test]
fn false_then_only_condition_falls_through() {
    let src = "fn test() i32 { var x i32 = 3; if x < 0 { x = 100; } return x; }";
    assert_eq!(both_ways(src), vec![3]);
}
