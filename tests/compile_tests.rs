//! Compiler integration tests: graph construction API to ffmpeg argument lists

use ffgraph::{opt, param, FfgraphError, FilterGraph, ParamValue};

#[test]
fn test_passthrough_elides_map() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let out = graph.output(&[source], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(tokens, ["-i", "in.mp4", "out.mp4"]);
}

#[test]
fn test_sub_stream_selection_requires_map() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let out = graph.output(&[source.video()], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(tokens, ["-i", "in.mp4", "-map", "0:v", "out.mp4"]);
}

#[test]
fn test_two_inputs_require_maps() {
    let mut graph = FilterGraph::new();
    let first = graph.input("a.mp4");
    let second = graph.input("b.mp4");
    let out = graph.output(&[first.video(), second.audio()], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(
        tokens,
        ["-i", "a.mp4", "-i", "b.mp4", "-map", "0:v", "-map", "1:a", "out.mp4"]
    );
}

#[test]
fn test_scale_filter_end_to_end() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let scaled = graph
        .filter(&[source], "scale", vec![1280.into(), 720.into()], vec![])
        .unwrap();
    let out = graph.output(&[scaled], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(
        tokens,
        [
            "-i",
            "in.mp4",
            "-filter_complex",
            "[0]scale=1280:720[s1]",
            "-map",
            "[s1]",
            "out.mp4"
        ]
    );
}

#[test]
fn test_emission_order_and_flag_policies() {
    let mut graph = FilterGraph::new();
    let source = graph.input_with("in.mp4", vec![opt("ss", "5"), opt("re", true)]);
    let out = graph.output_with(
        &[source],
        "out.mp4",
        vec![opt("c:v", "libx264"), opt("shortest", true)],
    );
    let terminal = graph.global_args(out, vec![opt("hide_banner", true), opt("stats", false)]);

    let tokens = graph.compile(terminal).unwrap();
    assert_eq!(
        tokens,
        [
            "-hide_banner",
            "-nostats",
            "-ss",
            "5",
            "-re",
            "-i",
            "in.mp4",
            "-c:v",
            "libx264",
            "-shortest",
            "out.mp4"
        ]
    );
}

#[test]
fn test_overwrite_output_prepends_y() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let out = graph.output(&[source], "out.mp4");
    let terminal = graph.overwrite_output(out);

    let tokens = graph.compile(terminal).unwrap();
    assert_eq!(tokens, ["-y", "-i", "in.mp4", "out.mp4"]);
}

#[test]
fn test_default_parameters_are_omitted() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let scaled = graph
        .filter(
            &[source.video()],
            "scale",
            vec![],
            vec![param("w", 1280), ("flags".to_string(), ParamValue::Default)],
        )
        .unwrap();
    let out = graph.output(&[scaled], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(tokens[3], "[0:v]scale=w=1280[s1]");
}

#[test]
fn test_all_default_parameters_drop_equals_sign() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let trimmed = graph
        .filter(
            &[source.video()],
            "trim",
            vec![],
            vec![("start".to_string(), ParamValue::Default)],
        )
        .unwrap();
    let out = graph.output(&[trimmed], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(tokens[3], "[0:v]trim[s1]");
}

#[test]
fn test_boolean_filter_parameters_become_digits() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let padded = graph
        .filter(
            &[source.video()],
            "pad",
            vec![],
            vec![param("aspect", "4/3"), param("eval", true)],
        )
        .unwrap();
    let out = graph.output(&[padded], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(tokens[3], "[0:v]pad=aspect=4/3:eval=1[s1]");
}

#[test]
fn test_multi_output_filter_labels() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let pads = graph
        .filter_multi(&[source.video()], "split", vec![2.into()], vec![])
        .unwrap();
    let out = graph.output(&[pads[0], pads[1]], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(
        tokens,
        [
            "-i",
            "in.mp4",
            "-filter_complex",
            "[0:v]split=2[s1#0][s1#1]",
            "-map",
            "[s1#0]",
            "-map",
            "[s1#1]",
            "out.mp4"
        ]
    );
}

#[test]
fn test_fan_out_auto_fix_inserts_split() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let flipped = graph
        .filter(&[source.video()], "hflip", vec![], vec![])
        .unwrap();
    let first = graph.output(&[flipped], "a.mp4");
    let second = graph.output(&[flipped], "b.mp4");
    let merged = graph.merge_outputs(&[first, second]);

    let mut strict = graph.clone();
    let refused = strict.compile_with(merged, false);
    assert!(matches!(
        refused,
        Err(FfgraphError::MultipleConsumers { count: 2, .. })
    ));

    let tokens = graph.compile(merged).unwrap();
    assert_eq!(
        tokens,
        [
            "-i",
            "in.mp4",
            "-filter_complex",
            "[0:v]hflip[s1];[s1]split=2[s2#0][s2#1]",
            "-map",
            "[s2#0]",
            "a.mp4",
            "-map",
            "[s2#1]",
            "b.mp4"
        ]
    );
}

#[test]
fn test_filter_clauses_emitted_in_topological_order() {
    let mut graph = FilterGraph::new();
    let base = graph.input("base.mp4");
    let top = graph.input("top.mp4");
    let scaled = graph
        .filter(&[base.video()], "scale", vec![640.into(), 480.into()], vec![])
        .unwrap();
    let flipped = graph.filter(&[top.video()], "hflip", vec![], vec![]).unwrap();
    let merged = graph
        .filter(&[scaled, flipped], "overlay", vec![], vec![])
        .unwrap();
    let out = graph.output(&[merged], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    assert_eq!(
        tokens[5],
        "[0:v]scale=640:480[s2];[1:v]hflip[s3];[s2][s3]overlay[s4]"
    );
}

#[test]
fn test_filter_parameter_escaping() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let titled = graph
        .filter(
            &[source.video()],
            "drawtext",
            vec![],
            vec![param("text", "a:b,c")],
        )
        .unwrap();
    let out = graph.output(&[titled], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    // The colon is escaped at the parameter level (then its backslash again at
    // the clause level); the comma only at the clause level.
    assert_eq!(tokens[3], "[0:v]drawtext=text=a\\\\:b\\,c[s1]");
}

#[test]
fn test_deterministic_recompilation() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let flipped = graph
        .filter(&[source.video()], "hflip", vec![], vec![])
        .unwrap();
    let first = graph.output(&[flipped], "a.mp4");
    let second = graph.output(&[flipped], "b.mp4");
    let merged = graph.merge_outputs(&[first, second]);

    let once = graph.compile(merged).unwrap();
    let twice = graph.compile(merged).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_empty_output_rejected() {
    let mut graph = FilterGraph::new();
    graph.input("in.mp4");
    let out = graph.output(&[], "out.mp4");

    let result = graph.compile(out);
    assert!(matches!(result, Err(FfgraphError::EmptyOutput { .. })));
}

#[test]
fn test_command_line_rendering() {
    let mut graph = FilterGraph::new();
    let source = graph.input("my file.mp4");
    let out = graph.output(&[source], "out.mp4");

    let command = graph.command_line(out).unwrap();
    assert!(command.starts_with("ffmpeg "));
    assert!(command.contains("'my file.mp4'"));
}
