//! Debate Coach CLI - argument coaching and debate practice
//!
//! A command-line tool that coaches students on argument structure and lets
//! them practise against a simulated opponent.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use debatecoach_core::coach::{IMPROVEMENT_HINT, MISSING_SOURCE_HINT};
use debatecoach_core::{
    ArgumentCoach, ArgumentStructure, CoachError, CoachingSession, Config, Credentials,
    DebateSession, DebateSimulator, ErrorKind, FactCheckRequest, FactCheckResult,
    FactCheckStatus, FactChecker, Feedback, FeedbackOrigin, Position, ReplyOrigin, ServiceError,
    Services, SessionStore, SimulatorEvent, TextClassifier, default_config,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser)]
#[command(
    name = "debatecoach",
    version,
    about = "Debate Coach - build and test your arguments",
    long_about = "Coaches argument structure (claim, evidence, reinforcement), fact-checks cited \
                  sources and runs practice debates against a simulated opponent."
)]
struct Cli {
    /// TOML configuration file overriding the built-in defaults
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive argument coaching
    Coach {
        /// Debate topic (prompted for when omitted)
        #[arg(short, long, value_name = "TOPIC")]
        topic: Option<String>,

        /// Your position: for or against
        #[arg(short, long, value_name = "POSITION")]
        position: Option<Position>,
    },

    /// Practice debate against the simulated opponent
    Debate,

    /// Analyse the structure of a single argument
    Classify {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fact-check a single claim
    Check {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => default_config(),
    };

    match cli.command {
        Commands::Coach { topic, position } => run_coach(&config, topic, position).await,
        Commands::Debate => run_debate(&config).await,
        Commands::Classify { text, json } => run_classify(&config, &text, json),
        Commands::Check { text, json } => run_check(&config, &text, json).await,
    }
}

/// Setup logging based on verbosity level. `RUST_LOG` takes precedence.
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

fn build_services(config: &Config) -> Result<Services, CoachError> {
    Services::from_credentials(&Credentials::from_env(), config)
}

async fn run_coach(
    config: &Config,
    topic: Option<String>,
    position: Option<Position>,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = build_services(config)?;
    let coach = match ArgumentCoach::new(config, services.clone()) {
        Ok(coach) => coach,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };
    if services.generation.is_none() {
        print_warning("UPSTAGE_API_KEY가 없습니다. 코칭 피드백은 기본 템플릿으로 제공됩니다.");
    }
    if services.retrieval.is_none() {
        print_warning("PERPLEXITY_API_KEY가 없습니다. 팩트체크 기능이 제한됩니다.");
    }

    print_banner("Debate Coach - 논증 코칭");
    let mut input = prompt_lines();
    let mut rng = rand::rng();
    let mut store: SessionStore<CoachingSession> = SessionStore::new();
    let mut id = store.create();

    let mut topic = match topic {
        Some(topic) => topic,
        None => {
            println!("{}", "토론 주제 예시:".bold());
            for (i, example) in coach.example_topics().iter().enumerate() {
                println!("  {}. {}", i + 1, example);
            }
            match read_topic(&mut input, coach.example_topics()).await? {
                Some(topic) => topic,
                None => return Ok(()),
            }
        }
    };
    let position = match position {
        Some(position) => position,
        None => match read_position(&mut input).await? {
            Some(position) => position,
            None => return Ok(()),
        },
    };

    let guide = coach.start(store.get_mut(id)?, &topic, position);
    println!();
    println!("{}", guide.bright_white());
    print_help(&[
        ("/check <글>", "팩트체크"),
        ("/progress", "논증 완성도"),
        ("/history", "대화 기록"),
        ("/topic <주제>", "주제 변경"),
        ("/reset", "처음부터 다시"),
        ("/quit", "종료"),
    ]);

    while let Some(line) = read_line(&mut input, "학생").await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) | ("/exit", _) => break,
            ("/progress", _) => print_progress(store.get(id)?),
            ("/history", _) => print_transcript(store.get(id)?),
            ("/check", "") => print_warning("팩트체크할 문장을 함께 입력하세요: /check <글>"),
            ("/check", text) => {
                if coach.classifier().extract_sources(text).is_empty() {
                    print_warning(MISSING_SOURCE_HINT);
                }
                let result = coach.fact_check(store.get_mut(id)?, text).await;
                print_fact_check(&result);
            }
            ("/topic", "") => print_warning("새 주제를 함께 입력하세요: /topic <주제>"),
            ("/topic", new_topic) => {
                topic = new_topic.to_string();
                println!("{}", coach.start(store.get_mut(id)?, &topic, position).bright_white());
            }
            ("/reset", _) => {
                id = store.restart(id)?;
                println!("{}", "새로운 코칭 세션을 시작합니다.".bright_green());
                println!("{}", coach.start(store.get_mut(id)?, &topic, position).bright_white());
            }
            _ => {
                let turn = coach.submit(store.get_mut(id)?, line, &mut rng).await?;
                print_structure(&turn.structure);
                print_feedback(&turn.feedback);
                if let Some(result) = &turn.fact_check {
                    println!(
                        "{} {}",
                        "📌 출처 발견:".bold(),
                        turn.structure.sources.join(", ")
                    );
                    print_fact_check(result);
                }
            }
        }
    }

    println!("{}", "코칭을 마칩니다.".bright_green().bold());
    Ok(())
}

async fn run_debate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let services = build_services(config)?;
    let mut simulator = DebateSimulator::new(config, services.generation.clone());
    simulator.on_event(create_console_callback(simulator.opponent_name().to_string()));

    print_banner("Debate Coach - 토론 연습");
    println!("{} {}", "주제:".bold(), config.opponent.topic.bright_white());
    println!(
        "{} {} ({})",
        "상대:".bold(),
        simulator.opponent_name().bright_cyan(),
        config.opponent.stance.yellow()
    );
    print_help(&[("/restart", "새 토론 시작"), ("/quit", "종료")]);

    let mut input = prompt_lines();
    let mut rng = rand::rng();
    let mut store: SessionStore<DebateSession> = SessionStore::new();
    let mut id = store.create();

    while let Some(line) = read_line(&mut input, "나").await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/restart" => {
                id = store.restart(id)?;
                println!("{}", "새로운 토론을 시작합니다.".bright_green());
                continue;
            }
            _ => {}
        }

        match simulator.take_turn(store.get_mut(id)?, line, &mut rng).await {
            Ok(turn) => {
                if let ReplyOrigin::Degraded(err) = &turn.reply.origin {
                    print_warning(&degraded_reply_notice(err));
                }
            }
            Err(CoachError::SessionSurrendered) => {
                print_warning("상대가 이미 패배를 인정했습니다. /restart로 새 토론을 시작하세요.");
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!("{}", "토론을 마칩니다.".bright_green().bold());
    Ok(())
}

fn run_classify(config: &Config, text: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = TextClassifier::new(&config.patterns)?;
    let structure = classifier.classify(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&structure)?);
    } else {
        print_structure(&structure);
    }
    Ok(())
}

async fn run_check(config: &Config, text: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = TextClassifier::new(&config.patterns)?;
    let services = build_services(config)?;
    let checker = FactChecker::new(config, &services);

    let request = FactCheckRequest::from_submission(text, &classifier);
    let result = checker.check(&request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if request.source_hint.is_empty() {
            print_warning(MISSING_SOURCE_HINT);
        }
        print_fact_check(&result);
    }
    Ok(())
}

/// Create a callback that prints simulator events to the console.
fn create_console_callback(opponent: String) -> Box<dyn Fn(SimulatorEvent) + Send + Sync> {
    Box::new(move |event| match event {
        SimulatorEvent::RoundStarted { round } => {
            println!("{}", format!("── 라운드 {} ──", round).dimmed());
        }
        SimulatorEvent::SurrenderEvaluated(decision) => {
            tracing::debug!(
                probability = decision.probability,
                eligible = decision.eligible,
                "surrender check"
            );
        }
        SimulatorEvent::OpponentReplied { text } => {
            println!("{} {}", "▶".bright_cyan(), opponent.bright_cyan().bold());
            for line in textwrap(&text, 66).lines() {
                println!("  {}", line);
            }
            println!();
        }
        SimulatorEvent::Conceded { round } => {
            println!("{}", "═".repeat(70).bright_green());
            println!(
                "{}",
                format!("  🏳  {}이(가) {}라운드 만에 패배를 인정했습니다!", opponent, round)
                    .bright_green()
                    .bold()
            );
            println!("{}", "═".repeat(70).bright_green());
            println!("{}", "/restart로 새 토론을 시작할 수 있습니다.".dimmed());
        }
    })
}

type PromptLines = Lines<BufReader<Stdin>>;

fn prompt_lines() -> PromptLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Print a prompt and read one line. `None` at end of input.
async fn read_line(input: &mut PromptLines, prompt: &str) -> std::io::Result<Option<String>> {
    print!("{} ", format!("{}>", prompt).bright_yellow().bold());
    std::io::stdout().flush()?;
    input.next_line().await
}

async fn read_topic(
    input: &mut PromptLines,
    examples: &[String],
) -> std::io::Result<Option<String>> {
    loop {
        let Some(line) = read_line(input, "주제 (번호 또는 직접 입력)").await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let topic = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| examples.get(i))
            .cloned()
            .unwrap_or_else(|| line.to_string());
        return Ok(Some(topic));
    }
}

async fn read_position(input: &mut PromptLines) -> std::io::Result<Option<Position>> {
    loop {
        let Some(line) = read_line(input, "입장 (찬성/반대)").await? else {
            return Ok(None);
        };
        match line.trim().parse::<Position>() {
            Ok(position) => return Ok(Some(position)),
            Err(err) => print_warning(&err),
        }
    }
}

fn print_banner(title: &str) {
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", format!("  {}", title).bright_blue().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!();
}

fn print_help(commands: &[(&str, &str)]) {
    let help = commands
        .iter()
        .map(|(cmd, what)| format!("{} {}", cmd.bright_white(), what.dimmed()))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", help);
    println!("{}", "─".repeat(70).dimmed());
}

fn print_structure(structure: &ArgumentStructure) {
    let mark = |present: bool| if present { "✓".green() } else { "✗".red() };
    println!(
        "{} {}  주장 {}  근거 {} ({}개)  보강자료 {}",
        "📝".bold(),
        structure.section_type.label().bright_white().bold(),
        mark(structure.has_claim),
        mark(structure.has_evidence),
        structure.evidence_count,
        mark(structure.has_reinforcement),
    );
    if structure.has_sources() {
        println!("   출처: {}", structure.sources.join(", ").cyan());
    }
}

fn print_feedback(feedback: &Feedback) {
    if let FeedbackOrigin::Degraded(err) = &feedback.origin {
        print_warning(&feedback.text);
        println!("  {}", service_hint(err).dimmed());
        return;
    }
    println!("{}", "코치:".bright_cyan().bold());
    for line in feedback.text.lines() {
        println!("  {}", line);
    }
    println!();
}

fn print_fact_check(result: &FactCheckResult) {
    let status = result.status();
    let icon = match status {
        FactCheckStatus::Verified => "✅",
        FactCheckStatus::PartiallyVerified => "⚠️",
        FactCheckStatus::Failed => "❌",
    };

    println!("{}", "🔍 팩트체크 결과".bold());
    println!(
        "  {} {} (신뢰도 {:.0}%)",
        icon,
        status.label().bold(),
        result.confidence * 100.0
    );
    if !result.search_summary.is_empty() {
        println!("  {}", "웹 검색 결과:".dimmed());
        for line in textwrap(&result.search_summary, 66).lines() {
            println!("    {}", line);
        }
    }
    for source in &result.sources {
        println!("  🔗 {}", source.underline());
    }
    if !result.explanation.is_empty() && result.explanation != result.search_summary {
        println!("  {} {}", "검증 상세:".dimmed(), result.explanation);
    }
    if let Some(err) = &result.error {
        println!("  {}", service_hint(err).dimmed());
    }
    if result.needs_better_source() {
        println!("  {}", format!("💡 {}", IMPROVEMENT_HINT).blue());
    }
    println!();
}

/// What the student can do about a service that could not be used.
fn service_hint(err: &ServiceError) -> &'static str {
    match err.kind() {
        ErrorKind::ConfigurationMissing => {
            "API 키를 .env 파일이나 환경 변수에 설정한 뒤 다시 실행하세요."
        }
        ErrorKind::TransportFailure => {
            "서비스 호출에 실패했습니다. 네트워크 연결과 API 키를 확인하고 잠시 후 다시 시도하세요."
        }
    }
}

fn degraded_reply_notice(err: &ServiceError) -> String {
    match err.kind() {
        ErrorKind::ConfigurationMissing => {
            "상대 모델이 설정되지 않아 기본 반론으로 답했습니다.".to_string()
        }
        ErrorKind::TransportFailure => {
            format!("모델 응답 실패, 기본 반론으로 대체했습니다: {}", err)
        }
    }
}

fn print_transcript(session: &CoachingSession) {
    if session.transcript.is_empty() {
        println!("{}", "아직 대화 기록이 없습니다.".dimmed());
        return;
    }
    for turn in &session.transcript {
        println!("{}", format!("[{}]", turn.speaker.display_name()).bold());
        for line in textwrap(&turn.text, 66).lines() {
            println!("  {}", line);
        }
    }
    println!();
}

fn print_progress(session: &CoachingSession) {
    let progress = &session.progress;
    println!(
        "{} {}/3",
        "📊 논증 완성도".bold(),
        progress.completed_steps()
    );
    match &progress.claim {
        Some(claim) => println!("  {} 주장: {}", "✓".green(), claim),
        None => println!("  {} 주장 작성 필요", "✗".red()),
    }
    if progress.evidence.is_empty() {
        println!("  {} 근거 추가 필요", "✗".red());
    } else {
        println!("  {} 근거 {}건", "✓".green(), progress.evidence.len());
    }
    if progress.reinforcement.is_empty() {
        println!("  {} 보강자료 추가 필요", "✗".red());
    } else {
        for note in &progress.reinforcement {
            println!("  {} {}", "✓".green(), note);
        }
    }
    if !session.fact_checks.is_empty() {
        println!("  팩트체크 {}회", session.fact_checks.len());
    }
}

/// Print a warning message
fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg.yellow());
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_line_len + word_len + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textwrap_breaks_on_width() {
        let wrapped = textwrap("하나 둘 셋 넷 다섯", 5);
        assert_eq!(wrapped, "하나 둘\n셋 넷\n다섯");
    }

    #[test]
    fn test_service_hint_depends_on_error_kind() {
        let missing = ServiceError::NotConfigured("UPSTAGE_API_KEY".to_string());
        let timeout = ServiceError::Transport("timed out".to_string());
        assert!(service_hint(&missing).contains("API 키를"));
        assert_ne!(service_hint(&missing), service_hint(&timeout));
        assert_eq!(service_hint(&ServiceError::EmptyResponse), service_hint(&timeout));
    }

    #[test]
    fn test_degraded_reply_notice_names_transport_errors() {
        let timeout = ServiceError::Transport("timed out".to_string());
        assert!(degraded_reply_notice(&timeout).contains("timed out"));

        let missing = ServiceError::NotConfigured("UPSTAGE_API_KEY".to_string());
        assert!(degraded_reply_notice(&missing).contains("설정되지 않아"));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["debatecoach", "-vv", "coach", "--position", "반대"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Coach { topic: None, position: Some(Position::Against) }
        ));

        let cli = Cli::try_parse_from(["debatecoach", "classify", "--json", "첫째, 효율이 높다."]).unwrap();
        assert!(matches!(cli.command, Commands::Classify { json: true, .. }));
    }
}
