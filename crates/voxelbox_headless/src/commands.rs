use glam::{IVec3, Vec3};
use voxelbox_shared::block::Material;
use voxelbox_shared::inventory::Inventory;
use voxelbox_shared::recipe::GRID_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Noop,
    Stop,
    Help,
    Break(IVec3),
    Release,
    Place { target: IVec3, normal: Vec3 },
    Select(usize),
    ToggleCrafting,
    SetCell {
        row: usize,
        col: usize,
        material: Option<Material>,
    },
    Fill { row: usize, col: usize, slot: usize },
    Take { row: usize, col: usize },
    Collect,
    Drop,
    Teleport { x: f32, y: f32, z: f32 },
    Look { view: Option<(f32, f32)> },
    Inventory,
    Status,
    InvalidUsage(String),
    Unknown(String),
}

fn usage(text: &str) -> Command {
    Command::InvalidUsage(format!("Usage: {text}"))
}

fn parse_all<T: std::str::FromStr>(args: &[&str]) -> Option<Vec<T>> {
    args.iter().map(|arg| arg.parse::<T>().ok()).collect()
}

fn parse_cell(row: &str, col: &str) -> Option<(usize, usize)> {
    let row = row.parse::<usize>().ok().filter(|r| *r < GRID_SIZE)?;
    let col = col.parse::<usize>().ok().filter(|c| *c < GRID_SIZE)?;
    Some((row, col))
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Noop;
    }

    let input = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if input.is_empty() {
        return Command::Noop;
    }

    let mut words = input.split_whitespace();
    let command = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    match command.as_str() {
        "stop" => Command::Stop,
        "help" => Command::Help,
        "release" => Command::Release,
        "craft" => Command::ToggleCrafting,
        "collect" => Command::Collect,
        "drop" => Command::Drop,
        "inv" => Command::Inventory,
        "status" => Command::Status,
        "break" => match parse_all::<i32>(&args).as_deref() {
            Some(&[x, y, z]) => Command::Break(IVec3::new(x, y, z)),
            _ => usage("/break <x> <y> <z>"),
        },
        "place" if args.len() == 6 => {
            let (pos, normal) = args.split_at(3);
            match (parse_all::<i32>(pos), parse_all::<f32>(normal)) {
                (Some(p), Some(n)) => Command::Place {
                    target: IVec3::new(p[0], p[1], p[2]),
                    normal: Vec3::new(n[0], n[1], n[2]),
                },
                _ => usage("/place <x> <y> <z> <nx> <ny> <nz>"),
            }
        }
        "place" => usage("/place <x> <y> <z> <nx> <ny> <nz>"),
        "select" => match args.as_slice() {
            [slot] => match slot.parse::<usize>() {
                Ok(slot) if slot < Inventory::SIZE => Command::Select(slot),
                _ => usage("/select <slot 0-8>"),
            },
            _ => usage("/select <slot 0-8>"),
        },
        "set" => match args.as_slice() {
            [row, col, material] => {
                let material = if material.eq_ignore_ascii_case("none") {
                    Some(None)
                } else {
                    Material::from_name(material).map(Some)
                };
                match (parse_cell(row, col), material) {
                    (Some((row, col)), Some(material)) => Command::SetCell { row, col, material },
                    _ => usage("/set <row 0-1> <col 0-1> <material|none>"),
                }
            }
            _ => usage("/set <row 0-1> <col 0-1> <material|none>"),
        },
        "fill" => match args.as_slice() {
            [row, col, slot] => {
                let slot = slot.parse::<usize>().ok().filter(|s| *s < Inventory::SIZE);
                match (parse_cell(row, col), slot) {
                    (Some((row, col)), Some(slot)) => Command::Fill { row, col, slot },
                    _ => usage("/fill <row 0-1> <col 0-1> <slot 0-8>"),
                }
            }
            _ => usage("/fill <row 0-1> <col 0-1> <slot 0-8>"),
        },
        "take" => match args.as_slice() {
            [row, col] => match parse_cell(row, col) {
                Some((row, col)) => Command::Take { row, col },
                None => usage("/take <row 0-1> <col 0-1>"),
            },
            _ => usage("/take <row 0-1> <col 0-1>"),
        },
        "tp" => match parse_all::<f32>(&args).as_deref() {
            Some(&[x, y, z]) if x.is_finite() && y.is_finite() && z.is_finite() => {
                Command::Teleport { x, y, z }
            }
            _ => usage("/tp <x> <y> <z>"),
        },
        "look" => match parse_all::<f32>(&args).as_deref() {
            Some(&[]) => Command::Look { view: None },
            Some(&[yaw, pitch]) if yaw.is_finite() && pitch.is_finite() => Command::Look {
                view: Some((yaw, pitch)),
            },
            _ => usage("/look [<yaw> <pitch>]"),
        },
        _ => Command::Unknown(input.to_string()),
    }
}
