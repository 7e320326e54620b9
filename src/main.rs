//! Sitegen Agent - LLM 静态站点生成与发布代理
//!
//! Usage:
//! - Normal mode: `sitegen-agent`
//! - With custom port: `sitegen-agent --port 8743`

use sitegen_agent::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("Sitegen Agent - LLM 静态站点生成与发布代理");
    println!();
    println!("USAGE:");
    println!("    sitegen-agent [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port");
    println!("    -h, --help       Print help information");
    println!();
    println!("EXAMPLES:");
    println!("    sitegen-agent                 # Normal mode");
    println!("    sitegen-agent --port 8743     # Custom port");
}

fn main() {
    let config = parse_args();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    rt.block_on(async {
        sitegen_agent::init_and_run_agent_with_config(config).await;
    });
}
