use chrono::{DateTime, Duration, TimeZone, Utc};
use walkgraph_core::geo::haversine_m;
use walkgraph_core::{
    Coordinate, DropReason, Ingest, LocationFix, SessionController, SessionError,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn fix(lat: f64, lon: f64, secs: i64) -> LocationFix {
    LocationFix {
        coord: Coordinate { lat, lon },
        timestamp: t0() + Duration::seconds(secs),
        accuracy_m: 5.0,
    }
}

fn in_progress() -> SessionController {
    let c = SessionController::new();
    c.begin_at("tur", "", t0()).unwrap();
    c.start_at(t0()).unwrap();
    c
}

#[test]
fn distanse_er_summen_av_segmentene() {
    let a = fix(59.9100, 10.7500, 0);
    let b = fix(59.9110, 10.7510, 10);
    let c_fix = fix(59.9120, 10.7530, 20);
    let expected = haversine_m(a.coord, b.coord) + haversine_m(b.coord, c_fix.coord);

    let c = in_progress();
    assert_eq!(c.ingest_location(a).unwrap(), Ingest::Accepted);
    assert_eq!(c.ingest_location(b).unwrap(), Ingest::Accepted);
    assert_eq!(c.ingest_location(c_fix).unwrap(), Ingest::Accepted);

    let walk = c.snapshot().unwrap();
    assert!((walk.total_distance_m() - expected).abs() < 1e-9);
    assert_eq!(walk.locations().len(), 3);
}

#[test]
fn fix_ute_av_rekkefolge_droppes_uten_dobbelttelling() {
    let a = fix(59.9100, 10.7500, 0);
    let b = fix(59.9110, 10.7510, 10);
    let c_fix = fix(59.9120, 10.7530, 20);

    let c = in_progress();
    c.ingest_location(a).unwrap();
    c.ingest_location(c_fix).unwrap();
    // b kommer for sent – skal droppes, ikke telles
    assert_eq!(
        c.ingest_location(b).unwrap(),
        Ingest::Dropped(DropReason::OutOfOrder)
    );

    let walk = c.snapshot().unwrap();
    assert!((walk.total_distance_m() - haversine_m(a.coord, c_fix.coord)).abs() < 1e-9);
    assert_eq!(walk.locations().len(), 2);

    // timestamps forblir stigende
    let ts: Vec<_> = walk.locations().iter().map(|f| f.timestamp).collect();
    assert!(ts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn fix_med_lik_timestamp_aksepteres() {
    let c = in_progress();
    c.ingest_location(fix(59.91, 10.75, 5)).unwrap();
    assert_eq!(
        c.ingest_location(fix(59.911, 10.75, 5)).unwrap(),
        Ingest::Accepted
    );
    assert_eq!(c.snapshot().unwrap().locations().len(), 2);
}

#[test]
fn forste_fix_gir_null_distanse() {
    let c = in_progress();
    c.ingest_location(fix(59.91, 10.75, 0)).unwrap();
    assert_eq!(c.snapshot().unwrap().total_distance_m(), 0.0);
}

#[test]
fn negativt_skritt_delta_senker_aldri_totalen() {
    let c = in_progress();
    assert_eq!(c.ingest_steps(100).unwrap(), Ingest::Accepted);
    assert_eq!(
        c.ingest_steps(-5).unwrap(),
        Ingest::Dropped(DropReason::NegativeDelta)
    );
    assert_eq!(c.snapshot().unwrap().total_steps(), 100);

    // null-delta er lov
    assert_eq!(c.ingest_steps(0).unwrap(), Ingest::Accepted);
    assert_eq!(c.snapshot().unwrap().total_steps(), 100);
}

#[test]
fn inntak_for_start_er_noop() {
    let c = SessionController::new();
    c.begin_at("tur", "", t0()).unwrap();

    assert_eq!(
        c.ingest_location(fix(59.91, 10.75, 0)).unwrap(),
        Ingest::Dropped(DropReason::NotTracking)
    );
    assert_eq!(
        c.ingest_steps(50).unwrap(),
        Ingest::Dropped(DropReason::NotTracking)
    );

    let walk = c.snapshot().unwrap();
    assert!(walk.locations().is_empty());
    assert_eq!(walk.total_steps(), 0);
}

#[test]
fn inntak_i_pause_droppes_stille() {
    let c = in_progress();
    c.ingest_steps(10).unwrap();
    c.pause_at(t0() + Duration::seconds(30)).unwrap();

    assert_eq!(
        c.ingest_steps(25).unwrap(),
        Ingest::Dropped(DropReason::NotTracking)
    );
    assert_eq!(
        c.ingest_location(fix(59.91, 10.75, 40)).unwrap(),
        Ingest::Dropped(DropReason::NotTracking)
    );
    assert_eq!(c.snapshot().unwrap().total_steps(), 10);
}

#[test]
fn inntak_etter_complete_gir_closed() {
    let c = in_progress();
    c.complete_at(t0() + Duration::seconds(60)).unwrap();

    assert_eq!(
        c.ingest_location(fix(59.91, 10.75, 70)),
        Err(SessionError::Closed)
    );
    assert_eq!(c.ingest_steps(5), Err(SessionError::Closed));
}

#[test]
fn inntak_uten_tur_droppes() {
    let c = SessionController::new();
    assert_eq!(
        c.ingest_steps(10).unwrap(),
        Ingest::Dropped(DropReason::NotTracking)
    );
}
