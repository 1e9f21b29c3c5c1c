//! Round-trip tests: compile, parse the rendered command, compile again
//!
//! The invariant is token-level idempotence: whatever the construction API
//! produced, reparsing its own output must compile to the same sequence.

use ffgraph::escape::join_command_line;
use ffgraph::{opt, param, parse_command, Catalogue, FilterGraph, OutputStream, ParsedCommand};

fn assert_roundtrip(mut graph: FilterGraph, terminal: OutputStream) {
    let first = graph.compile(terminal).unwrap();
    let command = format!("ffmpeg {}", join_command_line(&first));

    let ParsedCommand {
        graph: mut reparsed,
        terminal: reterminal,
    } = parse_command(&command, &Catalogue::builtin()).unwrap();
    let second = reparsed.compile(reterminal).unwrap();

    assert_eq!(first, second, "command was: {command}");
}

#[test]
fn test_roundtrip_passthrough() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let out = graph.output(&[source], "out.mp4");
    assert_roundtrip(graph, out);
}

#[test]
fn test_roundtrip_options_everywhere() {
    let mut graph = FilterGraph::new();
    let source = graph.input_with("in.mp4", vec![opt("ss", "5"), opt("re", true)]);
    let out = graph.output_with(
        &[source],
        "out.mp4",
        vec![opt("c:v", "libx264"), opt("crf", "18"), opt("an", true)],
    );
    let terminal = graph.global_args(out, vec![opt("y", true), opt("stats", false)]);
    assert_roundtrip(graph, terminal);
}

#[test]
fn test_roundtrip_scale_filter() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let scaled = graph
        .filter(&[source], "scale", vec![1280.into(), 720.into()], vec![])
        .unwrap();
    let out = graph.output(&[scaled], "out.mp4");
    assert_roundtrip(graph, out);
}

#[test]
fn test_roundtrip_overlay_two_inputs() {
    let mut graph = FilterGraph::new();
    let base = graph.input("base.mp4");
    let top = graph.input("top.mp4");
    let merged = graph
        .filter(
            &[base.video(), top.video()],
            "overlay",
            vec![],
            vec![param("x", 10), param("y", 20)],
        )
        .unwrap();
    let out = graph.output(&[merged, base.audio()], "out.mp4");
    assert_roundtrip(graph, out);
}

#[test]
fn test_roundtrip_amix_variable_arity() {
    let mut graph = FilterGraph::new();
    let first = graph.input("a.mp3");
    let second = graph.input("b.mp3");
    let mixed = graph
        .filter(
            &[first.audio(), second.audio()],
            "amix",
            vec![],
            vec![param("inputs", 2)],
        )
        .unwrap();
    let out = graph.output(&[mixed], "out.mp3");
    assert_roundtrip(graph, out);
}

#[test]
fn test_roundtrip_multi_output_split() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let pads = graph
        .filter_multi(&[source.video()], "split", vec![2.into()], vec![])
        .unwrap();
    let small = graph
        .filter(&[pads[1]], "scale", vec![320.into(), 240.into()], vec![])
        .unwrap();
    let first = graph.output(&[pads[0]], "full.mp4");
    let second = graph.output(&[small], "thumb.mp4");
    let merged = graph.merge_outputs(&[first, second]);
    assert_roundtrip(graph, merged);
}

#[test]
fn test_roundtrip_auto_fixed_fan_out() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let flipped = graph
        .filter(&[source.video()], "hflip", vec![], vec![])
        .unwrap();
    let first = graph.output(&[flipped], "a.mp4");
    let second = graph.output(&[flipped], "b.mp4");
    let merged = graph.merge_outputs(&[first, second]);
    assert_roundtrip(graph, merged);
}

#[test]
fn test_roundtrip_escaped_parameter_values() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let titled = graph
        .filter(
            &[source.video()],
            "drawtext",
            vec![],
            vec![
                param("text", "10:30 [start], o'clock; end"),
                param("fontsize", 24),
            ],
        )
        .unwrap();
    let out = graph.output(&[titled], "out.mp4");
    assert_roundtrip(graph, out);
}

#[test]
fn test_roundtrip_preserves_escaped_value_exactly() {
    let value = "a:b,c[d]'e;f=g";

    let mut graph = FilterGraph::new();
    let source = graph.input("in.mp4");
    let titled = graph
        .filter(&[source.video()], "drawtext", vec![], vec![param("text", value)])
        .unwrap();
    let out = graph.output(&[titled], "out.mp4");

    let tokens = graph.compile(out).unwrap();
    let command = format!("ffmpeg {}", join_command_line(&tokens));
    let ParsedCommand { graph: reparsed, .. } =
        parse_command(&command, &Catalogue::builtin()).unwrap();

    let recovered = reparsed
        .nodes()
        .iter()
        .find_map(|node| match node {
            ffgraph::Node::Filter { name, kwargs, .. } if name == "drawtext" => {
                kwargs.iter().find(|(key, _)| key == "text").cloned()
            }
            _ => None,
        })
        .expect("drawtext kwarg survives the round trip");
    assert_eq!(recovered.1, ffgraph::ParamValue::Str(value.to_string()));
}

#[test]
fn test_roundtrip_audio_chain() {
    let mut graph = FilterGraph::new();
    let source = graph.input("in.wav");
    let quieter = graph
        .filter(&[source.audio()], "volume", vec![], vec![param("volume", "0.5")])
        .unwrap();
    let trimmed = graph
        .filter(
            &[quieter],
            "atrim",
            vec![],
            vec![param("start", 2), param("end", 10)],
        )
        .unwrap();
    let out = graph.output_with(&[trimmed], "out.wav", vec![opt("ar", "44100")]);
    assert_roundtrip(graph, out);
}
