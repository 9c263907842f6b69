use reidtrack::{Palette, ProximityTracker, Region, RegionTracker, TrackerConfig, TrackingRegion};

fn detection(left: i32, top: i32, size: i32) -> TrackingRegion {
    TrackingRegion::new(Region::new(left, left + size, top, top + size), 0.9)
}

fn main() -> anyhow::Result<()> {
    println!("Testing ProximityTracker...");

    let config = TrackerConfig {
        hit_limit: 2,
        miss_limit: 3,
        ..TrackerConfig::default()
    };
    let mut tracker = ProximityTracker::new(config)?;
    let palette = Palette::default();

    // Two faces drift right, the second leaves after frame 4, a third enters at frame 6
    let mut frames: Vec<Vec<TrackingRegion>> = Vec::new();
    for i in 0..12 {
        let mut regions = vec![detection(10 + i * 2, 10, 40)];
        if i < 5 {
            regions.push(detection(100 + i * 3, 100, 50));
        }
        if i >= 6 {
            regions.push(detection(300, 300 - i, 40));
        }
        frames.push(regions);
    }

    for (index, regions) in frames.iter().enumerate() {
        let dead = tracker.process(regions, index as u64)?;

        println!(
            "\nFrame {}: {} tracklets, {} live, {} lost",
            index,
            tracker.tracklet_count(),
            tracker.live_regions().len(),
            tracker.lost_regions().len()
        );
        for (id, region, color) in tracker.painted_regions(&palette) {
            println!("  Track ID {}: {} color={:?}", id, region, color);
        }
        for tracklet in dead {
            println!("  Removed {}", tracklet);
        }
    }

    Ok(())
}
