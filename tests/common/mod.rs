#![allow(dead_code)]

use anyhow::Result;
use camfilter::InferenceEngine;
use ndarray::{ArrayD, ArrayView4, IxDyn};
use std::cell::Cell;
use std::rc::Rc;

/// Engine whose outputs come from a closure over the input tensor
pub struct FnEngine<F> {
    size: (u32, u32),
    calls: Rc<Cell<usize>>,
    respond: F,
}

impl<F> FnEngine<F>
where
    F: FnMut(ArrayView4<'_, f32>) -> Result<Vec<ArrayD<f32>>>,
{
    pub fn new(size: (u32, u32), respond: F) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let engine = Self {
            size,
            calls: Rc::clone(&calls),
            respond,
        };
        (engine, calls)
    }
}

impl<F> InferenceEngine for FnEngine<F>
where
    F: FnMut(ArrayView4<'_, f32>) -> Result<Vec<ArrayD<f32>>>,
{
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<ArrayD<f32>>> {
        assert_eq!(
            input.shape(),
            &[1, self.size.1 as usize, self.size.0 as usize, 3]
        );
        self.calls.set(self.calls.get() + 1);
        (self.respond)(input)
    }

    fn input_size(&self) -> (u32, u32) {
        self.size
    }
}

pub fn tensor(shape: &[usize], values: Vec<f32>) -> ArrayD<f32> {
    ArrayD::from_shape_vec(IxDyn(shape), values).unwrap()
}

/// RGBA frame filled with one color
pub fn solid_rgba(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    (0..width * height).flat_map(|_| px).collect()
}
