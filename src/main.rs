use protoguess::{render, render_sorted, Decoder, Message, DEFAULT_MAX_DEPTH};
use std::env;
use std::io::Read;

const USAGE: &str = "usage: protoguess [--raw] [--stream] [--sorted] [--max-depth N] [FILE...]";
const MAX_DEPTH_VAR: &str = "PROTOGUESS_MAX_DEPTH";

#[derive(Default)]
struct Options
{
    raw: bool,
    stream: bool,
    sorted: bool,
    help: bool,
    max_depth: Option<usize>,
    files: Vec<String>,
}

impl Options
{
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, Box<dyn std::error::Error>>
    {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--raw" => options.raw = true,
                "--stream" => options.stream = true,
                "--sorted" => options.sorted = true,
                "--max-depth" => {
                    let value = args.next().ok_or("--max-depth requires a value")?;
                    options.max_depth = Some(parse_depth(&value)?);
                }
                "-h" | "--help" => options.help = true,
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown option '{}'\n{}", flag, USAGE).into())
                }
                path => options.files.push(path.to_string()),
            }
        }

        if options.raw && options.stream {
            return Err("--raw and --stream cannot be combined".into());
        }

        Ok(options)
    }

    /// Build the decoder; `env_depth` is the value of `PROTOGUESS_MAX_DEPTH`, if set.
    fn decoder(&self, env_depth: Option<&str>) -> Result<Decoder, Box<dyn std::error::Error>>
    {
        let max_depth = match (self.max_depth, env_depth) {
            (Some(depth), _) => depth,
            (None, Some(value)) => parse_depth(value)?,
            (None, None) => DEFAULT_MAX_DEPTH,
        };

        Ok(Decoder::new().max_depth(max_depth))
    }

    fn decode(&self, decoder: &Decoder, data: &[u8]) -> protoguess::Result<Vec<Message>>
    {
        if self.raw {
            Ok(vec![decoder.decode(data)?])
        } else if self.stream {
            decoder.decode_grpc_stream(data)
        } else {
            let (msg, consumed) = decoder.decode_grpc(data)?;
            if consumed < data.len() {
                log::warn!(
                    "Ignoring {} bytes after the first gRPC frame",
                    data.len() - consumed
                );
            }
            Ok(vec![msg])
        }
    }

    fn render(&self, msg: &Message) -> String
    {
        match self.sorted {
            true => render_sorted(msg),
            false => render(msg),
        }
    }
}

fn parse_depth(value: &str) -> Result<usize, Box<dyn std::error::Error>>
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("invalid recursion limit '{}': {}", value, e).into())
}

fn read_file(path: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>>
{
    std::fs::read(path).map_err(|e| format!("{}: {}", path, e).into())
}

fn run() -> Result<(), Box<dyn std::error::Error>>
{
    let options = Options::parse(env::args().skip(1))?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let env_depth = env::var(MAX_DEPTH_VAR).ok();
    let decoder = options.decoder(env_depth.as_deref())?;

    let inputs: Vec<Vec<u8>> = if options.files.is_empty() {
        let mut data = vec![];
        std::io::stdin().read_to_end(&mut data)?;
        vec![data]
    } else {
        options
            .files
            .iter()
            .map(|path| read_file(path))
            .collect::<Result<_, _>>()?
    };

    for data in inputs {
        for msg in options.decode(&decoder, &data)? {
            println!("{}", options.render(&msg));
        }
    }

    Ok(())
}

fn main()
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("protoguess: {}", e);
        std::process::exit(1);
    }
}
