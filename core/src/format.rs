/// Formatert distanse: meter under 1 km, ellers km med to desimaler.
pub fn distance_string(meters: f64) -> String {
    let m = meters.max(0.0);
    if m < 1000.0 {
        format!("{:.0} m", m)
    } else {
        format!("{:.2} km", m / 1000.0)
    }
}

/// Formatert medgått tid: "MM:SS" under en time, ellers "H:MM:SS".
pub fn elapsed_string(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
