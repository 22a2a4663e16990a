use anyhow::{anyhow, bail, Context, Result};
use authorcheck_lib::api;
use authorcheck_lib::models::{DetectRequest, ResultSource, StoryRequest};
use authorcheck_lib::services::view_state::{download_file_name, transition, ViewEvent, ViewState};
use std::io::Read;

const USAGE: &str = "Usage:
  authorcheck detect <path|-> [--offline] [--json] [--provider <name[:model]>]
  authorcheck stats <path|->
  authorcheck article <topic...> [--save]
  authorcheck story <prompt...> [--max-tokens <n>] [--temperature <t>]

Notes:
  - `-` reads the text from stdin.
  - The API key is read from OPENAI_API_KEY or the config file.
  - Without a reachable model, `detect` falls back to heuristic analysis.";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// Positional words, skipping flags and their values.
fn positional(args: &[String], valued_flags: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for a in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if valued_flags.contains(&a.as_str()) {
            skip_next = true;
            continue;
        }
        if a.starts_with("--") {
            continue;
        }
        out.push(a.clone());
    }
    out
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin failed")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("read file failed: {}", source))
    }
}

async fn run_detect(args: &[String]) -> Result<()> {
    let rest = positional(args, &["--provider"]);
    let source = rest.first().ok_or_else(|| anyhow!("detect needs a path or `-`"))?;
    let text = read_input(source)?;

    let request = DetectRequest {
        text,
        provider: parse_arg_value(args, "--provider"),
        offline: has_flag(args, "--offline"),
    };
    let response = api::detect_text(request).await.map_err(|e| anyhow!(e))?;

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "Verdict: {}",
        if response.result.is_ai { "AI-generated" } else { "Human-written" }
    );
    println!("Confidence: {:.0}%", response.result.confidence * 100.0);
    println!(
        "Distribution: human {:.2} / ai {:.2}",
        response.distribution.human, response.distribution.ai
    );
    println!("Reasoning: {}", response.result.reasoning);
    if response.source == ResultSource::Heuristic {
        println!("(heuristic analysis; the AI model was not used)");
    }
    if response.truncated {
        println!("(input truncated to {} words for analysis)", response.analyzed_words);
    }
    Ok(())
}

fn run_stats(args: &[String]) -> Result<()> {
    let rest = positional(args, &[]);
    let source = rest.first().ok_or_else(|| anyhow!("stats needs a path or `-`"))?;
    let text = read_input(source)?;
    let stats = api::text_statistics(&text).map_err(|e| anyhow!(e))?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Drive a generation request through the view state machine and print it.
async fn run_generation<F>(input: String, request: F) -> Result<ViewState>
where
    F: std::future::Future<Output = Result<String, String>>,
{
    let state = transition(ViewState::Idle, ViewEvent::Submit(input));
    if !state.is_loading() {
        return Ok(state);
    }
    let event = match request.await {
        Ok(text) => ViewEvent::Succeeded(text),
        Err(e) => ViewEvent::Failed(e),
    };
    Ok(transition(state, event))
}

fn render(state: &ViewState) -> Result<&str> {
    match state {
        ViewState::Result(text) => {
            println!("{}", text);
            Ok(text.as_str())
        }
        ViewState::Error(message) => bail!("{}", message),
        ViewState::Idle | ViewState::Loading => bail!("no result"),
    }
}

async fn run_article(args: &[String]) -> Result<()> {
    let topic = positional(args, &[]).join(" ");
    let state = run_generation(
        topic.clone(),
        async { api::generate_article(topic.clone()).await.map(|r| r.article) },
    )
    .await?;
    let article = render(&state)?;

    if has_flag(args, "--save") {
        let file_name = download_file_name(&topic);
        std::fs::write(&file_name, article).with_context(|| format!("write {} failed", file_name))?;
        eprintln!("Saved to {}", file_name);
    }
    Ok(())
}

async fn run_story(args: &[String]) -> Result<()> {
    let prompt = positional(args, &["--max-tokens", "--temperature"]).join(" ");
    let request = StoryRequest {
        prompt: prompt.clone(),
        max_tokens: parse_arg_value(args, "--max-tokens").and_then(|s| s.parse().ok()),
        temperature: parse_arg_value(args, "--temperature").and_then(|s| s.parse().ok()),
    };
    let state = run_generation(
        prompt,
        async { api::generate_story(request).await.map(|r| r.story) },
    )
    .await?;
    render(&state)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    authorcheck_lib::init_logging();

    let rest = &args[2..];
    match args[1].as_str() {
        "detect" => run_detect(rest).await,
        "stats" => run_stats(rest),
        "article" => run_article(rest).await,
        "story" => run_story(rest).await,
        other => bail!("unknown command `{}`\n\n{}", other, USAGE),
    }
}
