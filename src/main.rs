use anyhow::Result;
use certificate_mailer::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置，第一个命令行参数可指定参与者 CSV
    let mut config = Config::load()?;
    if let Some(input_file) = std::env::args().nth(1) {
        config.input_file = input_file;
    }

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config)?;
    app.run().await?;

    Ok(())
}
