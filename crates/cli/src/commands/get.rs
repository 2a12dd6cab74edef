use super::GetArgs;
use peercache_cache::FetchRequest;
use peercache_transport::HttpGetter;
use std::io::Write;
use std::time::Duration;
use tokio::runtime::Handle;

pub async fn execute(args: GetArgs) -> eyre::Result<()> {
    let getter = HttpGetter::new(
        &args.node,
        &args.base_path,
        Duration::from_secs(args.timeout),
        Handle::current(),
    )?;

    let response = getter
        .fetch(&FetchRequest::new(args.group, args.key))
        .await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.value)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
