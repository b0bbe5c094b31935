use clap::{Arg, ArgAction, Command};
use std::fs;
use std::str::FromStr;

use mumtsim::journal::Journal;
use mumtsim::logging::{self, LogConfig, LogOutput};
use mumtsim::models::MissionMode;
use mumtsim::scenario::ScenarioConfig;
use mumtsim::simulation::{EngineState, SimulationEngine};

fn main() {
    let matches = Command::new("mumtsim")
        .version("0.1.0")
        .about("MUM-T 戦闘シミュレーション (Manned-Unmanned Teaming Simulation)")
        .long_about("UAV群・SAM・指揮機によるティック駆動型マルチエージェント戦闘シミュレーション\n\
                     描画なしでシナリオを最後まで実行し、作戦結果を表示します。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("実行するシナリオファイル(.yaml)のパスを指定します。\n\
                           指定しない場合、既定のシナリオで実行されます。")
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("作戦モード (all-out | mumt)。シナリオの指定を上書き")
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(clap::value_parser!(u64))
                .help("乱数シードを上書き")
        )
        .arg(
            Arg::new("max-ticks")
                .long("max-ticks")
                .value_name("TICKS")
                .value_parser(clap::value_parser!(u64))
                .help("打ち切りティック数を上書き")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FILE")
                .help("最終状況をYAMLで書き出す")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .default_value("console")
                .help("ログ出力先 (console | file | both)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace | debug | info | warn | error)。-v より優先")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let output = match matches.get_one::<String>("log-output").map(|s| LogOutput::from_str(s)) {
        Some(Ok(output)) => output,
        Some(Err(e)) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        None => LogOutput::Console,
    };
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| logging::parse_log_level(s))
        .unwrap_or_else(|| logging::level_for_verbosity(verbose_level));

    let _log_guard = match logging::init_logging(LogConfig {
        level,
        output,
        ..LogConfig::default()
    }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    println!("MUM-T 戦闘シミュレーション - mumtsim v0.1.0");
    println!();

    if let Err(e) = run(&matches, verbose_level) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

/// 引数に従ってシナリオを組み立てて実行
fn run(matches: &clap::ArgMatches, verbose_level: u8) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = match matches.get_one::<String>("scenario") {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            if verbose_level > 0 {
                println!("シナリオファイル読み込み完了: {}", path);
            }
            scenario
        }
        None => ScenarioConfig::default(),
    };

    if let Some(mode) = matches.get_one::<String>("mode") {
        scenario.sim.mode = MissionMode::from_str(mode)?;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        scenario.sim.seed = *seed;
    }
    if let Some(max_ticks) = matches.get_one::<u64>("max-ticks") {
        scenario.sim.max_ticks = *max_ticks;
    }
    scenario.validate()?;

    if matches.get_flag("info") {
        scenario.print_summary();
        return Ok(());
    }

    execute_scenario(scenario, verbose_level, matches.get_one::<String>("report"))
}

/// シナリオの実行
fn execute_scenario(
    scenario: ScenarioConfig,
    verbose_level: u8,
    report_path: Option<&String>,
) -> Result<(), Box<dyn std::error::Error>> {
    scenario.print_summary();
    println!();

    let mode = scenario.sim.mode;
    let max_ticks = scenario.sim.max_ticks;

    let mut engine = SimulationEngine::new(scenario);
    engine.verbose_level = verbose_level;

    let mut journal = Journal::default();
    journal.extend(&engine.start(mode)?.messages);

    let executed = engine.run(max_ticks, &mut journal)?;

    let report = engine.status();
    report.print_table();
    println!();

    if engine.state != EngineState::Ended {
        println!("打ち切り: {} ティック実行しましたが目標が残っています。", executed);
        println!();
    }

    println!("=== イベントログ (直近{}件) ===", journal.len());
    for entry in journal.iter().rev() {
        println!("{}", Journal::format_entry(entry));
    }

    if let Some(path) = report_path {
        let yaml = serde_yaml::to_string(&report)?;
        fs::write(path, yaml)?;
        if verbose_level > 0 {
            println!("状況レポートを書き出しました: {}", path);
        }
    }

    Ok(())
}
