mod pool_tests;

use std::cmp::Ordering;
use glam::Vec3;
use rand::Rng;
use rbush_3d::AABB;

pub fn init_logging()
{
    let _ = colog::basic_builder().is_test(true).try_init();
}

pub fn arr_to_box(arr: [f32; 6]) -> AABB
{
    AABB::from(arr)
}

pub const DATA: [[f32; 6]; 48] =
[
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0], [10.0, 10.0, 10.0, 10.0, 10.0, 10.0], [20.0, 20.0, 20.0, 20.0, 20.0, 20.0],
    [25.0, 0.0, 0.0, 25.0, 0.0, 0.0], [35.0, 10.0, 5.0, 35.0, 10.0, 5.0], [45.0, 20.0, 10.0, 45.0, 20.0, 10.0],
    [0.0, 25.0, 50.0, 0.0, 25.0, 50.0], [10.0, 35.0, 60.0, 10.0, 35.0, 60.0], [20.0, 45.0, 30.0, 20.0, 45.0, 30.0],
    [25.0, 25.0, 25.0, 25.0, 25.0, 25.0], [35.0, 35.0, 35.0, 35.0, 35.0, 35.0], [45.0, 45.0, 45.0, 45.0, 45.0, 45.0],
    [50.0, 0.0, 25.0, 50.0, 0.0, 25.0], [60.0, 10.0, 30.0, 60.0, 10.0, 30.0], [70.0, 20.0, 30.0, 70.0, 20.0, 30.0],
    [75.0, 0.0, 10.0, 75.0, 0.0, 10.0], [85.0, 10.0, 60.0, 85.0, 10.0, 60.0], [95.0, 20.0, 0.0, 95.0, 20.0, 0.0],
    [50.0, 25.0, 20.0, 50.0, 25.0, 20.0], [60.0, 35.0, 50.0, 60.0, 35.0, 50.0], [70.0, 45.0, 70.0, 70.0, 45.0, 70.0],
    [75.0, 25.0, 45.0, 75.0, 25.0, 45.0], [85.0, 35.0, 15.0, 85.0, 35.0, 15.0], [95.0, 45.0, 5.0, 95.0, 45.0, 5.0],
    [0.0, 50.0, 0.0, 0.0, 50.0, 0.0], [10.0, 60.0, 80.0, 10.0, 60.0, 80.0], [20.0, 70.0, 40.0, 20.0, 70.0, 40.0],
    [25.0, 50.0, 20.0, 25.0, 50.0, 20.0], [35.0, 60.0, 55.0, 35.0, 60.0, 55.0], [45.0, 70.0, 35.0, 45.0, 70.0, 35.0],
    [0.0, 75.0, 30.0, 0.0, 75.0, 30.0], [10.0, 85.0, 50.0, 10.0, 85.0, 50.0], [20.0, 95.0, 25.0, 20.0, 95.0, 25.0],
    [25.0, 75.0, 45.0, 25.0, 75.0, 45.0], [35.0, 85.0, 50.0, 35.0, 85.0, 50.0], [45.0, 95.0, 15.0, 45.0, 95.0, 15.0],
    [50.0, 50.0, 50.0, 50.0, 50.0, 50.0], [60.0, 60.0, 60.0, 60.0, 60.0, 60.0], [70.0, 70.0, 70.0, 70.0, 70.0, 70.0],
    [75.0, 50.0, 30.0, 75.0, 50.0, 30.0], [85.0, 60.0, 30.0, 85.0, 60.0, 30.0], [95.0, 70.0, 45.0, 95.0, 70.0, 45.0],
    [50.0, 75.0, 20.0, 50.0, 75.0, 20.0], [60.0, 85.0, 65.0, 60.0, 85.0, 65.0], [70.0, 95.0, 85.0, 70.0, 95.0, 85.0],
    [75.0, 75.0, 75.0, 75.0, 75.0, 75.0], [85.0, 85.0, 85.0, 85.0, 85.0, 85.0], [95.0, 95.0, 95.0, 95.0, 95.0, 95.0],
];

pub fn data() -> Vec<AABB>
{
    DATA.iter().copied().map(arr_to_box).collect()
}

// points along the xy diagonal
pub fn some_data(n: usize) -> Vec<AABB>
{
    (0..n).map(|i| AABB::point(Vec3::new(i as f32, i as f32, 0.0))).collect()
}

// a box somewhere around [-1, 1], up to `size` large on each axis
pub fn rand_box(rng: &mut impl Rng, size: f32) -> AABB
{
    let min = Vec3::new(
        rng.random::<f32>() * (2.0 - size) - 1.0,
        rng.random::<f32>() * (2.0 - size) - 1.0,
        rng.random::<f32>() * (2.0 - size) - 1.0);
    let extent = Vec3::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()) * size;
    AABB::new(min, min + extent)
}

pub fn rand_boxes(rng: &mut impl Rng, n: usize, size: f32) -> Vec<AABB>
{
    (0..n).map(|_| rand_box(rng, size)).collect()
}

pub fn compare_boxes(a: &AABB, b: &AABB) -> Ordering
{
    a.min.x.total_cmp(&b.min.x)
        .then(a.min.y.total_cmp(&b.min.y))
        .then(a.min.z.total_cmp(&b.min.z))
        .then(a.max.x.total_cmp(&b.max.x))
        .then(a.max.y.total_cmp(&b.max.y))
        .then(a.max.z.total_cmp(&b.max.z))
}

// order-insensitive comparison of two sets of boxes
#[track_caller]
pub fn assert_same_boxes<'a>(actual: impl IntoIterator<Item = &'a AABB>, expected: impl IntoIterator<Item = &'a AABB>)
{
    let mut actual: Vec<AABB> = actual.into_iter().copied().collect();
    let mut expected: Vec<AABB> = expected.into_iter().copied().collect();
    actual.sort_by(compare_boxes);
    expected.sort_by(compare_boxes);
    assert_eq!(actual, expected);
}
