use argh::FromArgs;

use headlamp::blob::{self, ExecutionStrategy, LogBlobFilter};
use headlamp::image::{Image, ImageSize};

#[derive(FromArgs)]
/// Detect headlight-sized blobs in a synthetic night scene
struct Args {
    /// width of the scene
    #[argh(option, default = "64")]
    width: usize,

    /// height of the scene
    #[argh(option, default = "48")]
    height: usize,

    /// execution strategy: serial, parallel or fixed
    #[argh(option, default = "String::from(\"parallel\")")]
    strategy: String,

    /// number of threads for the fixed strategy
    #[argh(option, default = "4")]
    threads: usize,

    /// intensity above which a pixel is lit
    #[argh(option, default = "127")]
    threshold: u8,
}

fn parse_strategy(name: &str, threads: usize) -> Result<ExecutionStrategy, String> {
    match name {
        "serial" => Ok(ExecutionStrategy::Serial),
        "parallel" => Ok(ExecutionStrategy::ParallelRows),
        "fixed" => Ok(ExecutionStrategy::Fixed(threads)),
        _ => Err(format!("unknown strategy: {name}")),
    }
}

/// Dark scene with a grid of 3x3 lamps and a wide lit panel in one corner.
fn night_scene(size: ImageSize) -> Result<Image<u8, 1>, Box<dyn std::error::Error>> {
    let data = (0..size.area())
        .map(|idx| {
            let (r, c) = (idx / size.width, idx % size.width);
            let lamp = (r % 12).abs_diff(6) <= 1 && (c % 12).abs_diff(6) <= 1;
            let panel = r < 10 && c < 10;
            if lamp || panel {
                200
            } else {
                ((r * 7 + c * 13) % 40) as u8
            }
        })
        .collect();
    Ok(Image::new(size, data)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let strategy = parse_strategy(&args.strategy, args.threads)?;

    let size = ImageSize {
        width: args.width,
        height: args.height,
    };
    let scene = night_scene(size)?;

    // binarize the scene into lit / unlit pixels
    let mut mono = Image::<u8, 1>::from_size_val(size, 0)?;
    blob::threshold::binarize(&scene, &mut mono, args.threshold, strategy)?;

    let filter = LogBlobFilter::headlight()?;
    log::info!(
        "scanning {} with threshold {} ({strategy:?})",
        size,
        filter.threshold()
    );

    let now = std::time::Instant::now();
    let centers = blob::blob_centers(&mono, &filter, strategy)?;
    log::info!("found {} blobs in {:?}", centers.len(), now.elapsed());

    for center in &centers {
        log::info!("blob at row {} col {}", center.row, center.col);
    }

    Ok(())
}
