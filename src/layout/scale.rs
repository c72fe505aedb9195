use super::Viewport;

/// Linear map from publication year to horizontal position. The domain is
/// padded by half a year on each side so the extreme years do not sit on
/// the margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YearScale {
    min_year: i32,
    max_year: i32,
    range_start: f32,
    range_end: f32,
    fallback: f32,
}

impl YearScale {
    pub fn new(min_year: i32, max_year: i32, viewport: Viewport, margin: f32) -> Self {
        let (min_year, max_year) = (min_year.min(max_year), min_year.max(max_year));
        let margin = margin.clamp(0.0, viewport.width * 0.25);
        Self {
            min_year,
            max_year,
            range_start: margin,
            range_end: viewport.width - margin,
            fallback: viewport.width * 0.5,
        }
    }

    pub fn x_for_year(&self, year: i32) -> f32 {
        self.x_for_value(year as f32)
    }

    /// Falls back to the viewport midpoint when the mapping is not finite.
    pub fn x_for_value(&self, year: f32) -> f32 {
        let domain_start = self.min_year as f32 - 0.5;
        let domain_end = self.max_year as f32 + 0.5;
        let t = (year - domain_start) / (domain_end - domain_start);
        let x = self.range_start + t * (self.range_end - self.range_start);
        if x.is_finite() { x } else { self.fallback }
    }

    /// Axis tick years, thinned to at most `max_ticks` labels.
    pub fn ticks(&self, max_ticks: usize) -> Vec<i32> {
        if max_ticks == 0 {
            return Vec::new();
        }

        let span = (i64::from(self.max_year) - i64::from(self.min_year)) as usize + 1;
        let step = span.div_ceil(max_ticks).max(1);
        (self.min_year..=self.max_year).step_by(step).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 600.0)
    }

    #[test]
    fn years_map_inside_the_margins_in_order() {
        let scale = YearScale::new(2010, 2020, viewport(), 50.0);
        let first = scale.x_for_year(2010);
        let last = scale.x_for_year(2020);

        assert!(first > 50.0 && last < 950.0);
        assert!(first < scale.x_for_year(2015) && scale.x_for_year(2015) < last);
        assert!((scale.x_for_year(2015) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn single_year_lands_on_the_midpoint() {
        let scale = YearScale::new(2021, 2021, viewport(), 50.0);
        assert!((scale.x_for_year(2021) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn non_finite_input_uses_the_midpoint() {
        let scale = YearScale::new(2000, 2005, viewport(), 50.0);
        assert_eq!(scale.x_for_value(f32::NAN), 500.0);
        assert_eq!(scale.x_for_value(f32::INFINITY), 500.0);
    }

    #[test]
    fn ticks_are_thinned_for_long_spans() {
        let scale = YearScale::new(1950, 2024, viewport(), 50.0);
        let ticks = scale.ticks(10);
        assert!(ticks.len() <= 10);
        assert_eq!(ticks.first(), Some(&1950));

        let short = YearScale::new(2019, 2021, viewport(), 50.0);
        assert_eq!(short.ticks(10), vec![2019, 2020, 2021]);
    }
}
