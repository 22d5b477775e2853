//! Contextual kana-to-kanji conversion over the scripted engine.
//!
//! A real deployment plugs in an engine-backed [`yomi::engine::ModelLoader`];
//! the scripted one keeps the example self-contained.

use anyhow::Result;
use std::sync::Arc;
use yomi::engine::scripted::{ScriptedLoader, ScriptedModel};
use yomi::Runtime;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let model = ScriptedModel::builder()
        .pieces(["きょうは", "アメ", "雨", "が", "ふる", "降る"])
        .script_pieces(["雨", "が", "降る"])
        .build();
    let loader = ScriptedLoader::new();
    loader.push(Arc::new(model));

    let runtime = Runtime::new(Box::new(loader));
    runtime.init_model(std::path::Path::new("scripted.gguf"))?;

    let left_context = "きょうは";
    let input = "あめがふる";
    let result = runtime.generate_with_context(left_context, input);

    println!("context: {left_context}");
    println!("input:   {input}");
    println!("output:  {result}");

    Ok(())
}
