//! Card compositor: turns one stats snapshot into an encoded PNG.
//!
//! Stages run strictly in order: clamp, allocate, background, header (avatar
//! and rank badge fetched together), primary grid, secondary grid, weapons
//! (images fetched one at a time), footer, encode. Optional images that fail
//! to load are replaced by placeholders; only allocation and drawing failures
//! fail the render.

use crate::assets::AssetLoader;
use crate::core::gfx::{Canvas, CornerRadii, DrawError, Paint};
use crate::game::format::format_playtime_coarse;
use crate::game::metrics::{Metric, build_primary, build_secondary, select_top_weapons, weapon_lines};
use crate::game::platform::Platform;
use crate::game::stats::{StatsSnapshot, WeaponRecord};
use crate::ui::color::{self, with_alpha};
use crate::ui::font::TextPainter;
use crate::ui::layout::{ContentArea, GridSpec, LayoutRect, SectionCursor, grid_placement, stacked_rows};
use log::{debug, error};
use std::sync::Arc;
use thiserror::Error;

pub const WIDTH_RANGE: (u32, u32) = (200, 1200);
pub const HEIGHT_RANGE: (u32, u32) = (150, 800);

const CHROME_INSET: f32 = 24.0;
const CONTENT_MARGIN_X: f32 = 40.0;

const HEADER_PADDING_X: f32 = 56.0;
const HEADER_BASELINE: f32 = 96.0;
const AVATAR_SIZE: f32 = 132.0;
const RANK_SIZE: f32 = 118.0;

const PRIMARY_GRID: (f32, f32, f32) = (122.0, 18.0, 16.0);
const SECONDARY_GRID: (f32, f32, f32) = (108.0, 20.0, 14.0);
const PRIMARY_TO_SECONDARY_GAP: f32 = 24.0;
const SECONDARY_TO_WEAPONS_GAP: f32 = 32.0;

const WEAPON_ROW_HEIGHT: f32 = 128.0;
const WEAPON_ROW_GAP: f32 = 18.0;
const WEAPON_PADDING: f32 = 26.0;
const WEAPON_PREVIEW: f32 = 108.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("无法创建图片，请检查服务器内存")]
    Unavailable,
    #[error("图片生成失败，请稍后重试")]
    Failed,
}

/// Caller-supplied render parameters. Dimensions and column counts are
/// clamped by the compositor; `accent_color: None` selects the default.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub player: String,
    pub platform: Platform,
    pub accent_color: Option<[f32; 4]>,
    pub width: u32,
    pub height: u32,
    pub primary_columns: u32,
    pub secondary_columns: u32,
    pub top_weapons: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            player: String::new(),
            platform: Platform::Pc,
            accent_color: None,
            width: 800,
            height: 500,
            primary_columns: 6,
            secondary_columns: 3,
            top_weapons: 3,
        }
    }
}

/// Which optional images were replaced by placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placeholders {
    pub avatar: bool,
    pub rank: bool,
    pub weapons: usize,
}

impl Placeholders {
    pub const fn total(&self) -> usize {
        self.avatar as usize + self.rank as usize + self.weapons
    }
}

#[derive(Debug)]
pub struct CardOutput {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub placeholders: Placeholders,
}

#[inline(always)]
pub fn clamp_dimensions(width: u32, height: u32) -> (u32, u32) {
    (
        width.clamp(WIDTH_RANGE.0, WIDTH_RANGE.1),
        height.clamp(HEIGHT_RANGE.0, HEIGHT_RANGE.1),
    )
}

pub struct CardRenderer {
    loader: AssetLoader,
    text: Arc<TextPainter>,
}

impl CardRenderer {
    pub fn new(loader: AssetLoader, text: Arc<TextPainter>) -> Self {
        Self { loader, text }
    }

    pub async fn render(
        &self,
        stats: &StatsSnapshot,
        config: &RenderConfig,
    ) -> Result<CardOutput, RenderError> {
        let (width, height) = clamp_dimensions(config.width, config.height);
        if (width, height) != (config.width, config.height) {
            debug!(
                "Clamped card size {}x{} to {width}x{height}.",
                config.width, config.height
            );
        }

        let canvas = Canvas::new(width, height).map_err(|e| {
            error!("Canvas creation failed: {e}");
            RenderError::Unavailable
        })?;
        let mut card = CardPainter {
            canvas,
            text: &self.text,
            accent: config.accent_color.unwrap_or(color::DEFAULT_ACCENT),
            width: width as f32,
            height: height as f32,
            placeholders: Placeholders::default(),
        };

        match self.compose(&mut card, stats, config).await {
            Ok(png) => Ok(CardOutput {
                png,
                width,
                height,
                placeholders: card.placeholders,
            }),
            Err(e) => {
                error!("Card rendering failed: {e}");
                Err(RenderError::Failed)
            }
        }
    }

    async fn compose(
        &self,
        card: &mut CardPainter<'_>,
        stats: &StatsSnapshot,
        config: &RenderConfig,
    ) -> Result<Vec<u8>, DrawError> {
        card.background()?;

        let (avatar, rank_img) = tokio::join!(
            self.loader.load(stats.avatar.as_deref()),
            self.loader.load(stats.rank_img.as_deref()),
        );
        let grid_top = card.header(stats, config, avatar.as_deref(), rank_img.as_deref())?;

        let area = ContentArea::with_margin(card.width, CONTENT_MARGIN_X);
        let mut cursor = SectionCursor::new(grid_top);

        let primary = build_primary(stats);
        let bottom = card.metric_grid(&area, cursor.y(), &primary, config.primary_columns, PRIMARY_GRID, true)?;
        cursor.advance_to(bottom, PRIMARY_TO_SECONDARY_GAP);

        let secondary = build_secondary(stats);
        let bottom = card.metric_grid(&area, cursor.y(), &secondary, config.secondary_columns, SECONDARY_GRID, false)?;
        cursor.advance_to(bottom, SECONDARY_TO_WEAPONS_GAP);

        let weapons = select_top_weapons(stats.weapons(), config.top_weapons);
        if !weapons.is_empty() {
            let rows = stacked_rows(&area, cursor.y(), weapons.len(), WEAPON_ROW_HEIGHT, WEAPON_ROW_GAP);
            for (rank, (weapon, row)) in weapons.iter().zip(&rows.cells).enumerate() {
                let preview = self.loader.load(weapon.image_url()).await;
                card.weapon_row(*row, weapon, rank, preview.as_deref())?;
            }
            card.weapons_caption(&area, cursor.y(), weapons.len());
        }

        card.footer()?;
        card.canvas.encode_png()
    }
}

/// Drawing state for one render call.
struct CardPainter<'a> {
    canvas: Canvas,
    text: &'a TextPainter,
    accent: [f32; 4],
    width: f32,
    height: f32,
    placeholders: Placeholders,
}

impl CardPainter<'_> {
    #[inline(always)]
    fn accent(&self, alpha: f32) -> [f32; 4] {
        with_alpha(self.accent, alpha)
    }

    #[inline(always)]
    fn label(&mut self, s: &str, px: f32, x: f32, baseline: f32, color: [f32; 4]) {
        self.text.draw(&mut self.canvas, s, px, x, baseline, color);
    }

    // --- Background ---

    fn background(&mut self) -> Result<(), DrawError> {
        let (w, h) = (self.width, self.height);
        self.canvas.fill_rect(
            LayoutRect::new(0.0, 0.0, w, h),
            &Paint::vertical(0.0, h, color::BACKGROUND_TOP, color::BACKGROUND_BOTTOM),
        )?;

        let panel = LayoutRect::new(CHROME_INSET, CHROME_INSET, w - 2.0 * CHROME_INSET, h - 2.0 * CHROME_INSET);
        let radii = CornerRadii::all(28.0);
        self.canvas
            .fill_rounded_rect(panel, radii, &Paint::Solid(with_alpha(color::PANEL, 0.88)))?;
        let sheen = Paint::horizontal(w * 0.4, w, self.accent(0.18), self.accent(0.04));
        self.canvas.fill_rounded_rect(panel, radii, &sheen)?;

        self.canvas.fill_triangle(
            [
                [w * 0.65, CHROME_INSET],
                [w - CHROME_INSET, CHROME_INSET],
                [w - CHROME_INSET, h * 0.5],
            ],
            self.accent(0.22),
        )?;

        let guide = with_alpha(color::GUIDE_LINE, 0.45);
        let step = (w - 96.0) / 5.0;
        for i in 0..=5 {
            let x = (i as f32).mul_add(step, 48.0);
            self.canvas
                .stroke_line([x, CHROME_INSET], [x - 40.0, h - CHROME_INSET], 1.0, guide)?;
        }
        Ok(())
    }

    // --- Header ---

    /// Returns the y-offset where the metric grids begin.
    fn header(
        &mut self,
        stats: &StatsSnapshot,
        config: &RenderConfig,
        avatar: Option<&image::RgbaImage>,
        rank_img: Option<&image::RgbaImage>,
    ) -> Result<f32, DrawError> {
        let x = HEADER_PADDING_X;
        let base = HEADER_BASELINE;

        self.canvas.fill_rounded_rect(
            LayoutRect::new(x, base - 64.0, 84.0, 34.0),
            CornerRadii::all(12.0),
            &Paint::Solid(self.accent(0.92)),
        )?;
        self.label("BF 6", 20.0, x + 14.0, base - 40.0, color::BADGE_TEXT);

        let name = stats.display_name(&config.player);
        let avatar_rect = LayoutRect::new(x, base - AVATAR_SIZE + 12.0, AVATAR_SIZE, AVATAR_SIZE);
        match avatar {
            Some(img) => self.canvas.draw_image(img, avatar_rect, 28.0)?,
            None => self.avatar_placeholder(avatar_rect, name)?,
        }

        let text_x = x + AVATAR_SIZE + 36.0;
        let rank_title = stats.rank_label();
        let subtitle = format!(
            "{rank_title} ｜ 战斗时间: {}",
            format_playtime_coarse(stats.seconds_played)
        );
        self.label(name, 54.0, text_x, base + 4.0, color::TEXT_TITLE);
        self.label(&subtitle, 24.0, text_x, base + 52.0, color::TEXT_LABEL);
        let tag = format!("平台: {}", config.platform.tag());
        self.label(&tag, 22.0, text_x, base + 88.0, color::TEXT_CAPTION);

        match rank_img {
            Some(img) => {
                let rect = LayoutRect::new(
                    self.width - RANK_SIZE - 72.0,
                    base - RANK_SIZE + 24.0,
                    RANK_SIZE,
                    RANK_SIZE,
                );
                self.canvas.draw_image(img, rect, 20.0)?;
            }
            None => {
                self.placeholders.rank = true;
                let rect = LayoutRect::new(self.width - 196.0, base - 78.0, 152.0, 76.0);
                self.canvas
                    .fill_rounded_rect(rect, CornerRadii::all(18.0), &Paint::Solid(self.accent(0.45)))?;
                self.label(&rank_title, 26.0, rect.x + 28.0, rect.y + 46.0, color::TEXT_STRONG);
            }
        }

        self.canvas.stroke_line(
            [x, base + 112.0],
            [self.width - x, base + 112.0],
            1.2,
            with_alpha(color::PANEL_MUTED, 0.6),
        )?;
        Ok(base + 132.0)
    }

    fn avatar_placeholder(&mut self, rect: LayoutRect, name: &str) -> Result<(), DrawError> {
        self.placeholders.avatar = true;
        self.canvas
            .fill_rounded_rect(rect, CornerRadii::all(28.0), &Paint::Solid(self.accent(0.35)))?;
        let initial: String = name
            .chars()
            .find(|c| !c.is_whitespace())
            .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect());
        let px = 64.0;
        let glyph_w = self.text.measure(&initial, px);
        self.label(
            &initial,
            px,
            rect.x + (rect.width - glyph_w) * 0.5,
            rect.y + rect.height * 0.5 + px * 0.35,
            color::TEXT_TITLE,
        );
        Ok(())
    }

    // --- Metric grids ---

    fn metric_grid(
        &mut self,
        area: &ContentArea,
        start_y: f32,
        metrics: &[Metric],
        columns: u32,
        (row_height, gutter_x, gutter_y): (f32, f32, f32),
        emphasize: bool,
    ) -> Result<f32, DrawError> {
        let spec = GridSpec {
            columns: columns.max(1) as usize,
            row_height,
            gutter_x,
            gutter_y,
        };
        let placement = grid_placement(area, start_y, metrics.len(), &spec);
        for (metric, cell) in metrics.iter().zip(&placement.cells) {
            self.metric_panel(*cell, metric, emphasize)?;
        }
        Ok(placement.bottom)
    }

    fn metric_panel(&mut self, cell: LayoutRect, metric: &Metric, emphasize: bool) -> Result<(), DrawError> {
        let radius = if emphasize { 20.0 } else { 18.0 };
        let fill = if emphasize {
            with_alpha(color::PANEL_EMPHASIS, 0.92)
        } else {
            with_alpha(color::PANEL, 0.88)
        };
        self.canvas
            .fill_rounded_rect(cell, CornerRadii::all(radius), &Paint::Solid(fill))?;
        if metric.highlight {
            self.canvas.fill_rounded_rect(
                LayoutRect::new(cell.x, cell.y, cell.width, 8.0),
                CornerRadii::top(radius),
                &Paint::Solid(self.accent(0.3)),
            )?;
        }

        let tx = cell.x + 20.0;
        self.label(metric.label, 20.0, tx, cell.y + 38.0, color::TEXT_LABEL);
        let (value_px, value_dy) = if emphasize { (44.0, 80.0) } else { (34.0, 74.0) };
        self.label(&metric.value, value_px, tx, cell.y + value_dy, color::TEXT_TITLE);
        if let Some(caption) = &metric.caption {
            self.label(caption, 18.0, tx, cell.bottom() - 18.0, color::TEXT_CAPTION);
        }
        Ok(())
    }

    // --- Weapons ---

    fn weapon_row(
        &mut self,
        row: LayoutRect,
        weapon: &WeaponRecord,
        rank: usize,
        preview: Option<&image::RgbaImage>,
    ) -> Result<(), DrawError> {
        self.canvas.fill_rounded_rect(
            row,
            CornerRadii::all(22.0),
            &Paint::Solid(with_alpha(color::PANEL, 0.9)),
        )?;
        self.canvas.fill_rounded_rect(
            LayoutRect::new(row.x, row.y, row.width, 8.0),
            CornerRadii::top(22.0),
            &Paint::Solid(self.accent(0.35)),
        )?;

        let px = row.x + WEAPON_PADDING;
        match preview {
            Some(img) => {
                let rect = LayoutRect::new(px, row.y + 10.0, WEAPON_PREVIEW, row.height - 20.0);
                self.canvas.draw_image(img, rect, 0.0)?;
            }
            None => {
                self.placeholders.weapons += 1;
                let rect = LayoutRect::new(px, row.y + 16.0, WEAPON_PREVIEW, row.height - 32.0);
                self.canvas.fill_rounded_rect(
                    rect,
                    CornerRadii::all(16.0),
                    &Paint::Solid(with_alpha(color::PANEL_MUTED, 0.6)),
                )?;
                self.label("无武器预览", 16.0, px + 12.0, row.y + row.height * 0.5, color::TEXT_MUTED);
            }
        }

        let (title, info) = weapon_lines(weapon, rank);
        let text_x = px + WEAPON_PREVIEW + 36.0;
        self.label(&title, 30.0, text_x, row.y + 48.0, color::TEXT_STRONG);
        self.label(&info, 20.0, text_x, row.y + 84.0, color::TEXT_CAPTION);
        Ok(())
    }

    fn weapons_caption(&mut self, area: &ContentArea, start_y: f32, shown: usize) {
        let caption = format!("武器统计 (Top {shown})");
        self.label(&caption, 18.0, area.x, start_y - 18.0, color::TEXT_MUTED);
    }

    // --- Footer ---

    fn footer(&mut self) -> Result<(), DrawError> {
        let (w, h) = (self.width, self.height);
        self.canvas.stroke_line(
            [48.0, h - 96.0],
            [w - 48.0, h - 96.0],
            1.0,
            with_alpha(color::GUIDE_LINE, 0.6),
        )?;
        self.label("数据来源：api.gametools.network", 18.0, 56.0, h - 58.0, color::TEXT_FOOTER);
        let stamp = chrono::Local::now().format("%Y/%m/%d %H:%M:%S");
        self.label(&format!("生成时间：{stamp}"), 18.0, 56.0, h - 26.0, color::TEXT_FOOTER);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::testing::{Reply, ScriptedFetcher, png_bytes};
    use crate::game::metrics::{build_primary, build_secondary};
    use std::time::Duration;

    const AVATAR: &str = "https://img/avatar.png";
    const RANK: &str = "https://img/rank.png";

    fn weapon(name: &str, kills: f64, image: &str) -> WeaponRecord {
        WeaponRecord {
            weapon_name: Some(name.to_string()),
            kills: Some(kills),
            kills_per_minute: Some(1.25),
            accuracy: Some("21.4%".to_string()),
            image: Some(image.to_string()),
            ..WeaponRecord::default()
        }
    }

    fn full_snapshot() -> StatsSnapshot {
        StatsSnapshot {
            user_name: Some("Ghost".into()),
            avatar: Some(AVATAR.into()),
            rank_img: Some(RANK.into()),
            rank: Some(87.0),
            rank_name: Some("Colonel".into()),
            seconds_played: Some(400_000.0),
            kills: Some(12_345.0),
            deaths: Some(6_000.0),
            kill_death: Some(2.06),
            kills_per_minute: Some(1.1),
            score_per_minute: Some(512.0),
            wins: Some(300.0),
            loses: Some(200.0),
            matches_played: Some(500.0),
            damage: Some(2_500_000.0),
            shots_hit: Some(40_000.0),
            shots_fired: Some(160_000.0),
            headshots: Some(2_000.0),
            melee_kills: Some(44.0),
            highest_kill_streak: Some(19.0),
            distance_traveled: Some(1_500_000.0),
            best_class_name: Some("Assault".into()),
            weapons: Some(vec![
                weapon("M4", 900.0, "https://img/w1.png"),
                weapon("AK", 1500.0, "https://img/w2.png"),
                weapon("SCAR", 1200.0, "https://img/w3.png"),
                weapon("Knife", 10.0, "https://img/w4.png"),
            ]),
            ..StatsSnapshot::default()
        }
    }

    fn all_images_fetcher() -> ScriptedFetcher {
        let png = || Reply::Bytes(png_bytes(4, 4, [200, 60, 60, 255]));
        ScriptedFetcher::default()
            .reply(AVATAR, png())
            .reply(RANK, png())
            .reply("https://img/w1.png", png())
            .reply("https://img/w2.png", png())
            .reply("https://img/w3.png", png())
            .reply("https://img/w4.png", png())
    }

    fn renderer(fetcher: Arc<ScriptedFetcher>) -> CardRenderer {
        let loader = AssetLoader::new(fetcher).with_timeout(Duration::from_millis(500));
        CardRenderer::new(loader, Arc::new(TextPainter::disabled()))
    }

    fn config() -> RenderConfig {
        RenderConfig {
            player: "Ghost".into(),
            ..RenderConfig::default()
        }
    }

    fn decoded_size(png: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(png).unwrap();
        (img.width(), img.height())
    }

    #[tokio::test]
    async fn fully_populated_snapshot_renders_without_placeholders() {
        let fetcher = Arc::new(all_images_fetcher());
        let out = renderer(fetcher.clone()).render(&full_snapshot(), &config()).await.unwrap();

        assert_eq!((out.width, out.height), (800, 500));
        assert_eq!(decoded_size(&out.png), (800, 500));
        assert_eq!(out.placeholders, Placeholders::default());
        assert_eq!(fetcher.calls(), 5, "avatar, rank and three weapons");
    }

    #[tokio::test]
    async fn weapon_images_are_fetched_in_kill_order() {
        let fetcher = Arc::new(all_images_fetcher());
        renderer(fetcher.clone()).render(&full_snapshot(), &config()).await.unwrap();
        let weapon_urls: Vec<String> = fetcher
            .seen()
            .into_iter()
            .filter(|u| u.contains("/w"))
            .collect();
        assert_eq!(
            weapon_urls,
            ["https://img/w2.png", "https://img/w3.png", "https://img/w1.png"]
        );
    }

    #[tokio::test]
    async fn zero_denominators_render_as_zero_percent() {
        let stats = StatsSnapshot {
            wins: Some(0.0),
            loses: Some(0.0),
            shots_hit: Some(0.0),
            shots_fired: Some(0.0),
            ..StatsSnapshot::default()
        };
        assert_eq!(build_primary(&stats)[3].value, "0%");
        assert_eq!(build_secondary(&stats)[1].value, "0%");

        let fetcher = Arc::new(ScriptedFetcher::default());
        let out = renderer(fetcher).render(&stats, &config()).await.unwrap();
        assert_eq!(decoded_size(&out.png), (800, 500));
    }

    #[tokio::test]
    async fn header_images_load_concurrently() {
        let slow = || Reply::Slow(Duration::from_millis(1500), png_bytes(4, 4, [20, 90, 200, 255]));
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .reply(AVATAR, slow())
                .reply(RANK, slow()),
        );
        let loader = AssetLoader::new(fetcher.clone()).with_timeout(Duration::from_secs(3));
        let renderer = CardRenderer::new(loader, Arc::new(TextPainter::disabled()));
        let stats = StatsSnapshot {
            weapons: None,
            ..full_snapshot()
        };

        let started = std::time::Instant::now();
        let out = renderer.render(&stats, &config()).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(fetcher.calls(), 2);
        assert!(!out.placeholders.avatar && !out.placeholders.rank);
        assert!(
            elapsed < Duration::from_millis(2800),
            "two 1.5s header fetches took {elapsed:?}; they should overlap"
        );
    }

    #[tokio::test]
    async fn unreachable_header_images_fall_back_to_placeholders() {
        let fetcher = Arc::new(
            all_images_fetcher()
                .reply(AVATAR, Reply::Fail)
                .reply(RANK, Reply::Fail),
        );
        let out = renderer(fetcher).render(&full_snapshot(), &config()).await.unwrap();
        assert!(out.placeholders.avatar && out.placeholders.rank);
        assert_eq!(out.placeholders.weapons, 0);
        assert_eq!((out.width, out.height), (800, 500));
        assert_eq!(decoded_size(&out.png), (800, 500));
    }

    #[tokio::test]
    async fn oversized_request_is_clamped_before_allocation() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let cfg = RenderConfig {
            width: 5_000,
            height: 4_000,
            ..config()
        };
        let out = renderer(fetcher).render(&StatsSnapshot::default(), &cfg).await.unwrap();
        assert_eq!((out.width, out.height), (1200, 800));
        assert_eq!(decoded_size(&out.png), (1200, 800));
    }

    #[tokio::test]
    async fn undersized_request_is_clamped_up() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let cfg = RenderConfig {
            width: 1,
            height: 0,
            primary_columns: 0,
            secondary_columns: 0,
            ..config()
        };
        let out = renderer(fetcher).render(&full_snapshot(), &cfg).await.unwrap();
        assert_eq!(decoded_size(&out.png), (200, 150));
    }

    #[tokio::test]
    async fn disabled_weapons_section_fetches_nothing() {
        let fetcher = Arc::new(all_images_fetcher());
        let stats = StatsSnapshot {
            avatar: None,
            rank_img: None,
            ..full_snapshot()
        };
        let cfg = RenderConfig {
            top_weapons: 0,
            ..config()
        };
        let out = renderer(fetcher.clone()).render(&stats, &cfg).await.unwrap();
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(out.placeholders.weapons, 0);
    }

    #[tokio::test]
    async fn failed_weapon_images_get_no_preview_panels() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let out = renderer(fetcher.clone()).render(&full_snapshot(), &config()).await.unwrap();
        assert_eq!(out.placeholders.weapons, 3);
        assert_eq!(out.placeholders.total(), 5);
        assert_eq!(fetcher.calls(), 5, "one attempt per image, no retries");
    }

    #[tokio::test]
    async fn background_covers_every_corner() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let out = renderer(fetcher).render(&StatsSnapshot::default(), &config()).await.unwrap();
        let img = image::load_from_memory(&out.png).unwrap().to_rgba8();
        for (x, y) in [(0, 0), (799, 0), (0, 499), (799, 499)] {
            assert_eq!(img.get_pixel(x, y).0[3], 255, "corner ({x}, {y})");
        }
    }

    #[test]
    fn clamp_dimensions_bounds() {
        assert_eq!(clamp_dimensions(800, 500), (800, 500));
        assert_eq!(clamp_dimensions(0, u32::MAX), (200, 800));
        assert_eq!(clamp_dimensions(u32::MAX, 0), (1200, 150));
    }

    #[test]
    fn render_errors_carry_user_messages() {
        assert_eq!(RenderError::Unavailable.to_string(), "无法创建图片，请检查服务器内存");
        assert_eq!(RenderError::Failed.to_string(), "图片生成失败，请稍后重试");
    }
}
