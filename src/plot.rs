//! Monthly trend chart: average rating as a line, review counts as bars on
//! a secondary axis, one x slot per month present in the series.

use std::path::Path;

use plotters::prelude::*;

use crate::records::MonthlyStat;

const CHART_SIZE: (u32, u32) = (1200, 600);

pub fn render(stats: &[MonthlyStat], path: &Path) -> anyhow::Result<()> {
    if stats.is_empty() {
        anyhow::bail!("no monthly stats to plot");
    }

    let max_count = stats
        .iter()
        .map(|stat| stat.review_count)
        .max()
        .unwrap_or(1)
        .max(1);

    let slots = -0.5f64..(stats.len() as f64 - 0.5);
    let bar_color = RGBColor(150, 150, 150);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|err| anyhow::anyhow!("fill chart background: {err}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Review Score by Month", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .right_y_label_area_size(50)
        .build_cartesian_2d(slots.clone(), 1.0f64..5.0f64)
        .map_err(|err| anyhow::anyhow!("build chart axes: {err}"))?
        .set_secondary_coord(slots, 0.0f64..(max_count as f64 * 1.2));

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(stats.len().min(24))
        .x_label_formatter(&|slot| {
            let index = slot.round();
            if index < 0.0 {
                return String::new();
            }
            stats
                .get(index as usize)
                .map(MonthlyStat::month_label)
                .unwrap_or_default()
        })
        .y_desc("Average Rating")
        .draw()
        .map_err(|err| anyhow::anyhow!("draw chart mesh: {err}"))?;

    chart
        .configure_secondary_axes()
        .y_desc("Number of Reviews")
        .draw()
        .map_err(|err| anyhow::anyhow!("draw secondary axis: {err}"))?;

    chart
        .draw_secondary_series(stats.iter().enumerate().map(|(index, stat)| {
            Rectangle::new(
                [
                    (index as f64 - 0.3, 0.0),
                    (index as f64 + 0.3, stat.review_count as f64),
                ],
                bar_color.mix(0.4).filled(),
            )
        }))
        .map_err(|err| anyhow::anyhow!("draw count bars: {err}"))?;

    chart
        .draw_series(LineSeries::new(
            stats
                .iter()
                .enumerate()
                .map(|(index, stat)| (index as f64, stat.avg_rating)),
            BLUE.stroke_width(2),
        ))
        .map_err(|err| anyhow::anyhow!("draw rating line: {err}"))?;

    chart
        .draw_series(stats.iter().enumerate().map(|(index, stat)| {
            Circle::new((index as f64, stat.avg_rating), 4, BLUE.filled())
        }))
        .map_err(|err| anyhow::anyhow!("draw rating markers: {err}"))?;

    root.present()
        .map_err(|err| anyhow::anyhow!("write chart: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg_for_a_small_series() -> anyhow::Result<()> {
        let stats = vec![
            MonthlyStat {
                year: 2023,
                month: 11,
                avg_rating: 4.2,
                review_count: 7,
            },
            MonthlyStat {
                year: 2023,
                month: 12,
                avg_rating: 3.8,
                review_count: 3,
            },
        ];
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trend.svg");

        render(&stats, &path)?;

        let svg = std::fs::read_to_string(&path)?;
        assert!(svg.contains("<svg"));
        Ok(())
    }

    #[test]
    fn empty_series_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(render(&[], &dir.path().join("empty.svg")).is_err());
    }
}
