use clap::Parser;
use fecsim::sender::{ChannelDispatcher, Config, UDPEndpoint};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Stream a file over UDP channels protected by XOR FEC
#[derive(Parser, Debug)]
#[command(name = "fecsim-sender", version, about)]
struct Args {
    /// File to stream
    file: PathBuf,

    /// JSON configuration, command line options override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Destination of channel 0, channel i uses port + i * port_stride
    #[arg(long, value_name = "IP:PORT")]
    dest: Option<String>,

    /// Number of channels
    #[arg(long)]
    channels: Option<usize>,

    /// Media packets per FEC group
    #[arg(short)]
    k: Option<u8>,

    /// Redundancy packets per FEC group
    #[arg(short)]
    r: Option<u8>,

    /// Source pacing in bit/s
    #[arg(long)]
    bitrate: Option<u64>,

    /// Bytes read per media packet
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Channels to enable, all when omitted
    #[arg(long, num_args = 1..)]
    enable: Vec<usize>,

    /// Channel loss rate
    #[arg(long, value_name = "CHANNEL=RATE", value_parser = parse_loss, num_args = 1..)]
    loss: Vec<(usize, f64)>,

    /// Stop after this number of seconds
    #[arg(long)]
    duration: Option<u64>,
}

fn parse_loss(arg: &str) -> Result<(usize, f64), String> {
    let (channel, rate) = arg
        .split_once('=')
        .ok_or_else(|| format!("{} is not CHANNEL=RATE", arg))?;
    let channel = channel
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("Invalid channel {}: {}", channel, e))?;
    let rate = rate
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid rate {}: {}", rate, e))?;
    Ok((channel, rate))
}

fn parse_dest(dest: &str) -> Result<UDPEndpoint, String> {
    let (addr, port) = dest
        .rsplit_once(':')
        .ok_or_else(|| format!("{} is not IP:PORT", dest))?;
    let port = port
        .parse::<u16>()
        .map_err(|e| format!("Invalid port {}: {}", port, e))?;
    let addr = addr.trim_start_matches('[').trim_end_matches(']');
    Ok(UDPEndpoint::new(None, addr.to_owned(), port))
}

fn load_config(args: &Args) -> Result<Config, String> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Fail to read {:?}: {}", path, e))?;
            serde_json::from_str::<Config>(&content)
                .map_err(|e| format!("Fail to parse {:?}: {}", path, e))?
        }
        None => Config::default(),
    };

    if let Some(dest) = &args.dest {
        config.destination = parse_dest(dest)?;
    }
    if let Some(channels) = args.channels {
        config.nb_channels = channels;
    }
    if let Some(k) = args.k {
        config.k = k;
    }
    if let Some(r) = args.r {
        config.r = r;
    }
    if let Some(bitrate) = args.bitrate {
        config.target_bitrate = bitrate;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), String> {
    let config = load_config(&args)?;
    log::info!("Configuration {:?}", config);

    if !args.file.is_file() {
        return Err(format!("{:?} is not a file", args.file));
    }

    let dispatcher = ChannelDispatcher::new(config).map_err(|e| e.to_string())?;
    dispatcher.set_source_path(&args.file);

    let enabled: Vec<usize> = match args.enable.is_empty() {
        true => (0..dispatcher.nb_channels()).collect(),
        false => args.enable.clone(),
    };
    for channel in enabled {
        dispatcher
            .set_channel_enabled(channel, true)
            .map_err(|e| e.to_string())?;
    }
    for (channel, rate) in &args.loss {
        dispatcher
            .set_loss_rate(*channel, *rate)
            .map_err(|e| e.to_string())?;
    }

    dispatcher.start().map_err(|e| e.to_string())?;

    let deadline = args.duration.map(|d| Instant::now() + Duration::from_secs(d));
    loop {
        std::thread::sleep(Duration::from_millis(100));

        if deadline.map(|d| Instant::now() >= d).unwrap_or(false) {
            log::info!("Duration elapsed");
            break;
        }

        if dispatcher.is_reader_finished() && dispatcher.queued_packets() == 0 {
            log::info!("Reader finished, channel queues drained");
            break;
        }
    }

    let read_failed = dispatcher.is_reader_finished() && !dispatcher.is_source_exhausted();
    dispatcher.stop();

    for (channel, stats) in dispatcher.channel_stats().iter().enumerate() {
        log::info!(
            "Channel {} queued={} sent={} dropped={} send_errors={} pending={}",
            channel,
            stats.queued,
            stats.sent,
            stats.dropped,
            stats.send_errors,
            stats.pending
        );
    }

    if read_failed {
        return Err(format!("Fail to read {:?} to the end", args.file));
    }
    Ok(())
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::builder().try_init().ok();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(-1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_dest, parse_loss};

    #[test]
    pub fn test_parse_loss() {
        assert_eq!(parse_loss("1=0.25").unwrap(), (1, 0.25));
        assert!(parse_loss("1").is_err());
        assert!(parse_loss("a=0.1").is_err());
    }

    #[test]
    pub fn test_parse_dest() {
        let endpoint = parse_dest("225.0.10.101:5557").unwrap();
        assert_eq!(endpoint.destination_group_address, "225.0.10.101");
        assert_eq!(endpoint.port, 5557);
        assert_eq!(parse_dest("[ff15::1]:4000").unwrap().destination_group_address, "ff15::1");
        assert!(parse_dest("nope").is_err());
    }
}
