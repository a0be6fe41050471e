use std::path::Path;

use console::Style;
use folio_core::config::ViewerConfig;
use folio_core::io::lazy::RawLayout;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    flag: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            flag: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

/// What `folio info` knows about an image before building anything.
pub struct ImageSummary<'a> {
    pub path: &'a Path,
    pub width: u32,
    pub height: u32,
    pub raw: Option<RawLayout>,
    pub huge: bool,
    pub base: (u32, u32),
    pub levels: &'a [(u32, u32)],
}

pub fn print_image_summary(summary: &ImageSummary<'_>, config: &ViewerConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Folio Image"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(11)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("File"),
        s.path.apply_to(summary.path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value
            .apply_to(format!("{}x{}", summary.width, summary.height))
    );
    let megapixels = summary.width as f64 * summary.height as f64 / 1.0e6;
    println!(
        "  {:<14}{}",
        s.label.apply_to("Megapixels"),
        s.value.apply_to(format!("{megapixels:.1}"))
    );

    match summary.raw {
        Some(layout) => println!(
            "  {:<14}{}",
            s.label.apply_to("Raw layout"),
            s.flag.apply_to(format!(
                "offset {} / stride {} B",
                layout.data_offset, layout.row_stride
            ))
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Raw layout"),
            s.disabled.apply_to("none (decoded in full)")
        ),
    }

    if summary.huge {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Huge"),
            s.flag.apply_to(format!(
                "banded to fit {} px, {} rows per band",
                config.huge_side, config.band_height
            ))
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Huge"),
            s.disabled.apply_to("no")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Pyramid"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Base"),
        s.value
            .apply_to(format!("{}x{}", summary.base.0, summary.base.1))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Filter"),
        s.value.apply_to(config.pyramid_filter)
    );
    for (i, (w, h)) in summary.levels.iter().enumerate() {
        println!(
            "    {:<12}{}",
            s.label.apply_to(format!("Level {i}")),
            s.value.apply_to(format!("{w}x{h}"))
        );
    }
    println!();
}
