use clap::Parser;
use sheet_packer::{Item, PackOptions, SheetSize, Solver};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "sheet_packer",
    about = "Nest rectangular parts onto sheets with guillotine cuts"
)]
struct Cli {
    /// Sheet dimensions as WxH (e.g. 600x300); 0 on an axis lets it grow
    #[arg(long, default_value = "0x0")]
    sheet: String,

    /// Parts as WxH:qty (e.g. 84x42:3 42x42:5)
    #[arg(long = "parts", num_args = 1.., required = true)]
    parts: Vec<String>,

    /// Blade kerf width in mm (default: 0)
    #[arg(long, default_value_t = 0.0)]
    kerf: f64,

    /// Disable part rotation
    #[arg(long)]
    no_rotate: bool,

    /// Print the solution as JSON
    #[arg(long)]
    json: bool,

    /// Log search progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_dimensions(s: &str, allow_zero: bool) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    let ok = |v: f64| v.is_finite() && (v > 0.0 || (allow_zero && v == 0.0));
    if !ok(width) || !ok(height) {
        return Err(format!("dimensions must be positive in '{}'", s));
    }
    Ok((width, height))
}

/// Expands `WxH:qty` into `qty` items whose payload is the index of the
/// `--parts` argument they came from.
fn parse_part(s: &str, index: usize) -> Result<Vec<Item<usize>>, String> {
    let (dims, qty) = match s.split_once(':') {
        Some((dims, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity in '{}'", s))?;
            (dims, qty)
        }
        None => (s, 1),
    };
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    let (width, height) = parse_dimensions(dims, false)?;
    Ok((0..qty).map(|_| Item::new(width, height, index)).collect())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let (width, height) = parse_dimensions(&cli.sheet, true).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let items: Vec<Item<usize>> = cli
        .parts
        .iter()
        .enumerate()
        .map(|(i, p)| parse_part(p, i))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
        .into_iter()
        .flatten()
        .collect();

    let options = PackOptions {
        sheet: SheetSize::new(width, height),
        kerf: cli.kerf,
        allow_rotate: !cli.no_rotate,
    };
    let solver = Solver::new(options).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let solution = solver.solve(items);

    if cli.json {
        match serde_json::to_string_pretty(&solution) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for (i, sheet) in solution.sheets.iter().enumerate() {
        println!("Sheet {} ({}x{}):", i + 1, sheet.width, sheet.height);
        for p in &sheet.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!(
                "  {} @ ({}, {}){}  <- {}",
                p.rect(),
                p.x,
                p.y,
                rot,
                cli.parts[p.payload]
            );
        }
        println!();
    }

    for u in &solution.unplaced {
        println!(
            "Unplaced: {}x{} <- {} ({:?})",
            u.item.width, u.item.height, cli.parts[u.item.payload], u.reason
        );
    }

    if let Some(strategy) = solution.strategy {
        println!("Strategy: {}", strategy);
    }
    println!(
        "Summary: {} sheet{} used, {} unplaced, {:.1}% waste",
        solution.sheet_count(),
        if solution.sheet_count() == 1 { "" } else { "s" },
        solution.unplaced.len(),
        solution.total_waste_percent(),
    );
}
