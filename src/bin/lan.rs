use std::{env, sync::Arc};

use anyhow::Context;
use proxyrace::{Candidate, HttpProbe, ProbeConfig};

fn main() -> anyhow::Result<()> {
    let port = env::args()
        .nth(1)
        .context("port not found")?
        .parse::<u16>()?;
    let subnet = env::args().nth(2).unwrap_or_else(|| "192.168.1".to_string());
    let candidates = (2..=255u8)
        .map(|host| Candidate::parse(&format!("http://{}.{}:{}", subnet, host, port)))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid subnet")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let probe = Arc::new(HttpProbe::new(ProbeConfig::direct()));
        let winner = proxyrace::race(candidates, probe)
            .await
            .context("nothing reported")?;
        println!("{}", winner);
        Ok(())
    })
}
