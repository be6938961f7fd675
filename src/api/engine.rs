use tracing::{debug, trace};

use crate::api::snapshot::ChartSnapshot;
use crate::core::{
    CoordinateMapper, OhlcvBar, PriceDomain, Viewport, VisibleRange, price_ticks,
    select_time_step_ms, time_ticks, visible_range_for,
};
use crate::error::{ChartError, ChartResult};
use crate::indicators::{
    DataWindowEntry, Indicator, IndicatorRegistry, draw_axis_label, merge_ranges,
};
use crate::interaction::{
    Cursor, CrosshairSnap, scroll_back, scroll_forward, snap_crosshair, zoom_in, zoom_out,
};
use crate::render::{
    Color, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
};
use crate::scene::{
    self, ChartLayout, DATE_AXIS_HEIGHT_PX, PANE_DIVIDER_PX, PRICE_AXIS_WIDTH_PX,
    build_crosshair, build_date_axis, build_indicator_pane, build_price_axis, build_price_pane,
    position_time_ticks,
};

/// Chart surface dimensions and tick-density knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartEngineConfig {
    pub width_px: f64,
    pub height_px: f64,
    pub desired_price_ticks: usize,
    pub desired_time_ticks: usize,
    pub scroll_step_bars: usize,
}

impl Default for ChartEngineConfig {
    fn default() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 720.0,
            desired_price_ticks: 5,
            desired_time_ticks: 8,
            scroll_step_bars: 1,
        }
    }
}

/// Owns the series, the indicator instances, and all view state, and turns
/// them into render frames for a pluggable backend.
///
/// The price series itself is registered as the first indicator, so the
/// price pane and every indicator sub-pane go through the same paint
/// pipeline.
pub struct ChartEngine<R: Renderer> {
    config: ChartEngineConfig,
    renderer: R,
    registry: IndicatorRegistry,
    bars: Vec<OhlcvBar>,
    indicators: Vec<Box<dyn Indicator>>,
    viewport: Viewport,
    cursor: Option<Cursor>,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(config: ChartEngineConfig, renderer: R) -> ChartResult<Self> {
        // One pane minimum; fails fast on an unusably small surface.
        ChartLayout::compute(config.width_px, config.height_px, 1)?;
        let registry = IndicatorRegistry::default();
        let price = registry.create_default("Price")?;
        Ok(Self {
            config,
            renderer,
            registry,
            bars: Vec::new(),
            indicators: vec![price],
            viewport: Viewport::new(config.width_px, config.height_px),
            cursor: None,
        })
    }

    #[must_use]
    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn available_indicators(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Replaces the series. Bars are sorted ascending by normalized time and
    /// every indicator is recomputed from scratch.
    pub fn set_bars(&mut self, mut bars: Vec<OhlcvBar>) {
        bars.sort_by_key(|bar| bar.time_ms());
        debug!(bar_count = bars.len(), "series replaced");
        self.bars = bars;
        for indicator in &mut self.indicators {
            indicator.recompute(&self.bars);
        }
    }

    /// Appends one bar. An in-order bar extends every indicator in O(1); an
    /// out-of-order bar falls back to a sorted insert and full recompute.
    pub fn append_bar(&mut self, bar: OhlcvBar) {
        let in_order = self
            .bars
            .last()
            .is_none_or(|last| last.time_ms() <= bar.time_ms());
        if in_order {
            self.bars.push(bar);
            for indicator in &mut self.indicators {
                indicator.append_bar(&bar);
            }
            trace!(time_ms = bar.time_ms(), "bar appended");
        } else {
            let position = self
                .bars
                .partition_point(|existing| existing.time_ms() <= bar.time_ms());
            self.bars.insert(position, bar);
            debug!(time_ms = bar.time_ms(), "out-of-order bar, full recompute");
            for indicator in &mut self.indicators {
                indicator.recompute(&self.bars);
            }
        }
    }

    /// Instantiates a registered indicator with a JSON config payload
    /// (`null` for defaults) and computes it over the current series.
    pub fn add_indicator(&mut self, name: &str, config: serde_json::Value) -> ChartResult<()> {
        let mut indicator = self.registry.create(name, config)?;
        indicator.recompute(&self.bars);
        debug!(indicator = name, "indicator added");
        self.indicators.push(indicator);
        Ok(())
    }

    /// Removes the first indicator with the given display name. The price
    /// series cannot be removed.
    pub fn remove_indicator(&mut self, name: &str) -> ChartResult<()> {
        let position = self
            .indicators
            .iter()
            .skip(1)
            .position(|indicator| indicator.name() == name)
            .ok_or_else(|| ChartError::InvalidData(format!("no indicator `{name}` to remove")))?;
        self.indicators.remove(position + 1);
        debug!(indicator = name, "indicator removed");
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        zoom_in(&mut self.viewport);
        trace!(bar_width = self.viewport.bar_width, "zoom in");
    }

    pub fn zoom_out(&mut self) {
        zoom_out(&mut self.viewport);
        trace!(bar_width = self.viewport.bar_width, "zoom out");
    }

    pub fn scroll_back(&mut self) {
        scroll_back(&mut self.viewport, self.config.scroll_step_bars);
    }

    pub fn scroll_forward(&mut self) {
        scroll_forward(&mut self.viewport, self.config.scroll_step_bars);
    }

    pub fn set_scroll_offset(&mut self, offset_bars: usize) {
        self.viewport.offset_bars = offset_bars;
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64) -> ChartResult<()> {
        ChartLayout::compute(width_px, height_px, self.pane_count())?;
        self.config.width_px = width_px;
        self.config.height_px = height_px;
        debug!(width_px, height_px, "surface resized");
        Ok(())
    }

    /// Cursor position in price-pane pixel coordinates.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = Some(Cursor { x, y });
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Builds the scene and hands it to the renderer.
    pub fn render(&mut self) -> ChartResult<()> {
        let frame = self.build_frame()?;
        self.renderer.render(&frame)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Crosshair data-window entries for every indicator at the snapped bar,
    /// or empty when the cursor is off the pane.
    #[must_use]
    pub fn data_window(&self) -> Vec<DataWindowEntry> {
        let Some(snap) = self.crosshair_snap() else {
            return Vec::new();
        };
        self.indicators
            .iter()
            .flat_map(|indicator| indicator.data_window(&self.bars, snap.bar_index))
            .collect()
    }

    /// Serializable view of the current chart state.
    pub fn snapshot(&self) -> ChartResult<ChartSnapshot> {
        let (price_viewport, range) = match self.price_pane_view()? {
            Some(view) => view,
            None => {
                return Ok(ChartSnapshot {
                    bar_count: self.bars.len(),
                    viewport: self.viewport,
                    visible_range: None,
                    price_domain: None,
                    price_ticks: Vec::new(),
                    time_tick_labels: Vec::new(),
                });
            }
        };
        let domain = self.price_pane_domain(range);
        let ticks = price_ticks(domain.min, domain.max, self.config.desired_price_ticks);
        let (start_ms, end_ms) = self.visible_span(range);
        let labels = time_ticks(start_ms, end_ms, self.config.desired_time_ticks)
            .into_iter()
            .map(|tick| tick.label)
            .collect();
        Ok(ChartSnapshot {
            bar_count: self.bars.len(),
            viewport: price_viewport,
            visible_range: Some(range),
            price_domain: Some(domain),
            price_ticks: ticks.into_iter().collect(),
            time_tick_labels: labels,
        })
    }

    fn pane_count(&self) -> usize {
        1 + self
            .indicators
            .iter()
            .filter(|indicator| !indicator.shares_price_scale())
            .count()
    }

    fn layout(&self) -> ChartResult<ChartLayout> {
        ChartLayout::compute(self.config.width_px, self.config.height_px, self.pane_count())
    }

    /// Price-pane viewport plus the clamped visible range, or `None` with no
    /// bars loaded.
    fn price_pane_view(&self) -> ChartResult<Option<(Viewport, VisibleRange)>> {
        let layout = self.layout()?;
        let viewport = Viewport {
            pane_width_px: layout.pane_width_px,
            pane_height_px: layout.pane_height_px,
            ..self.viewport
        };
        Ok(visible_range_for(self.bars.len(), viewport).map(|range| (viewport, range)))
    }

    /// Padded domain over visible bar lows/highs merged with every
    /// price-scale overlay's contribution.
    fn price_pane_domain(&self, range: VisibleRange) -> PriceDomain {
        let mut raw: Option<(f64, f64)> = None;
        for indicator in self.price_scale_indicators() {
            raw = merge_ranges(raw, indicator.data_range(&self.bars, range));
        }
        raw.map_or(
            PriceDomain { min: 0.0, max: 0.0 },
            |(min, max)| PriceDomain::padded(min, max),
        )
    }

    fn price_scale_indicators(&self) -> impl Iterator<Item = &dyn Indicator> {
        self.indicators
            .iter()
            .filter(|indicator| indicator.shares_price_scale())
            .map(Box::as_ref)
    }

    fn sub_pane_indicators(&self) -> impl Iterator<Item = &dyn Indicator> {
        self.indicators
            .iter()
            .filter(|indicator| !indicator.shares_price_scale())
            .map(Box::as_ref)
    }

    fn visible_span(&self, range: VisibleRange) -> (i64, i64) {
        (
            self.bars[range.start].time_ms(),
            self.bars[range.end].time_ms(),
        )
    }

    fn crosshair_snap(&self) -> Option<CrosshairSnap> {
        let cursor = self.cursor?;
        let (viewport, range) = self.price_pane_view().ok()??;
        let domain = self.price_pane_domain(range);
        let mapper = CoordinateMapper::new(viewport, range, domain).ok()?;
        snap_crosshair(mapper, cursor)
    }

    /// Assembles the full chart scene: background, price pane, indicator
    /// sub-panes, both axis strips, dividers, and the crosshair.
    pub fn build_frame(&self) -> ChartResult<RenderFrame> {
        let layout = self.layout()?;
        let mut frame = RenderFrame::new();
        frame.push_rect(RectPrimitive::new(
            0.0,
            0.0,
            layout.total_width_px,
            layout.total_height_px,
            scene::BACKGROUND_COLOR,
        ));
        self.paint_dividers(&layout, &mut frame);

        let Some((price_viewport, range)) = self.price_pane_view()? else {
            return Ok(frame);
        };

        let domain = self.price_pane_domain(range);
        let price_mapper = CoordinateMapper::new(price_viewport, range, domain)?;
        let value_ticks: Vec<f64> =
            price_ticks(domain.min, domain.max, self.config.desired_price_ticks)
                .into_iter()
                .collect();

        let (start_ms, end_ms) = self.visible_span(range);
        let generated = time_ticks(start_ms, end_ms, self.config.desired_time_ticks);
        let positioned = position_time_ticks(&self.bars, price_mapper, &generated);
        let tick_xs: Vec<f64> = positioned.iter().map(|tick| tick.x_px).collect();

        let overlays: Vec<&dyn Indicator> = self.price_scale_indicators().collect();
        let mut pane_frame =
            build_price_pane(&self.bars, price_mapper, &overlays, &value_ticks, &tick_xs);
        pane_frame.translate(0.0, layout.pane_top(0));
        frame.merge(pane_frame);

        let axis_viewport = Viewport {
            pane_width_px: PRICE_AXIS_WIDTH_PX,
            pane_height_px: layout.pane_height_px,
            ..self.viewport
        };
        let axis_mapper = CoordinateMapper::new(axis_viewport, range, domain)?;
        let mut axis_frame = build_price_axis(axis_mapper, &value_ticks, &overlays);
        axis_frame.translate(layout.axis_left(), layout.pane_top(0));
        frame.merge(axis_frame);

        for (offset, indicator) in self.sub_pane_indicators().enumerate() {
            let pane_index = offset + 1;
            let sub_viewport = Viewport {
                pane_width_px: layout.pane_width_px,
                pane_height_px: layout.pane_height_px,
                ..self.viewport
            };
            let scene = build_indicator_pane(
                &self.bars,
                indicator,
                sub_viewport,
                range,
                &tick_xs,
                self.config.desired_price_ticks,
            )?;
            let mut sub_frame = scene.frame;
            sub_frame.translate(0.0, layout.pane_top(pane_index));
            frame.merge(sub_frame);

            let sub_axis_mapper =
                CoordinateMapper::new(axis_viewport, range, scene.mapper.domain())?;
            let mut sub_axis =
                build_price_axis(sub_axis_mapper, &scene.value_ticks, &[indicator]);
            sub_axis.translate(layout.axis_left(), layout.pane_top(pane_index));
            frame.merge(sub_axis);
        }

        let mut date_frame = build_date_axis(&positioned);
        date_frame.translate(0.0, layout.date_axis_top());
        frame.merge(date_frame);

        if let Some(snap) = self.crosshair_snap() {
            self.paint_crosshair(&layout, price_viewport, axis_mapper, snap, &mut frame)?;
        }

        Ok(frame)
    }

    fn paint_dividers(&self, layout: &ChartLayout, frame: &mut RenderFrame) {
        frame.push_rect(RectPrimitive::new(
            layout.pane_width_px,
            0.0,
            PANE_DIVIDER_PX,
            layout.date_axis_top(),
            scene::DIVIDER_COLOR,
        ));
        for pane in 0..layout.pane_count {
            frame.push_rect(RectPrimitive::new(
                0.0,
                layout.pane_top(pane) + layout.pane_height_px,
                layout.total_width_px,
                PANE_DIVIDER_PX,
                scene::DIVIDER_COLOR,
            ));
        }
    }

    fn paint_crosshair(
        &self,
        layout: &ChartLayout,
        price_viewport: Viewport,
        axis_mapper: CoordinateMapper,
        snap: CrosshairSnap,
        frame: &mut RenderFrame,
    ) -> ChartResult<()> {
        let mut cross = build_crosshair(snap, price_viewport);
        cross.translate(0.0, layout.pane_top(0));
        frame.merge(cross);

        // Snapped price value on the axis strip.
        let mut label_frame = RenderFrame::new();
        draw_axis_label(
            snap.price,
            Color::rgb(0.0, 0.0, 0.0),
            axis_mapper,
            &mut label_frame,
        );
        label_frame.translate(layout.axis_left(), layout.pane_top(0));
        frame.merge(label_frame);

        // Snapped bar time under the date axis, formatted at the current
        // step granularity.
        if let Some(bar) = self.bars.get(snap.bar_index) {
            let (start_ms, end_ms) = self.visible_span(axis_mapper.range());
            let step = select_time_step_ms(end_ms - start_ms, self.config.desired_time_ticks);
            let label = crate::core::format_time_label(bar.time_ms(), step);
            if !label.is_empty() {
                frame.push_text(TextPrimitive::new(
                    label,
                    snap.x_px,
                    layout.date_axis_top() + DATE_AXIS_HEIGHT_PX / 2.0,
                    TextHAlign::Center,
                    Color::rgb(1.0, 1.0, 1.0),
                ));
            }
        }
        Ok(())
    }
}
