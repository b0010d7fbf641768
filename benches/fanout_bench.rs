use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nbtee::{
    buffers::{BufferPool, BufferPoolConfig, SharedBuffer},
    queue::{DrainOutcome, OutputQueue, OverflowPolicy},
};
use std::io;

fn benchmark_pool_recycling(c: &mut Criterion) {
    let mut group = c.benchmark_group("BufferPool_Recycling");

    for size in [512usize, 4096, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("acquire_release", size), size, |b, &size| {
            let mut pool = BufferPool::new(BufferPoolConfig::new().with_buffer_size(size));

            b.iter(|| {
                let mut data = pool.acquire();
                data.resize(size, 0xAB);
                let buffer = SharedBuffer::from_vec(data);
                black_box(buffer.len());
                pool.release(buffer);
            });
        });
    }

    group.finish();
}

fn benchmark_fan_out_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("OutputQueue_FanOut");
    let chunk = 4096usize;

    for sinks in [1usize, 8, 64].iter() {
        group.throughput(Throughput::Bytes((chunk * sinks) as u64));
        group.bench_with_input(BenchmarkId::new("offer_drain", sinks), sinks, |b, &sinks| {
            let mut pool = BufferPool::default();
            let mut queues: Vec<OutputQueue> = (0..sinks).map(|_| OutputQueue::new()).collect();
            let mut sink = io::sink();

            b.iter(|| {
                let mut data = pool.acquire();
                data.resize(chunk, 0x5A);
                let buffer = SharedBuffer::from_vec(data);

                for queue in queues.iter_mut() {
                    queue.offer(&buffer, 1 << 20, OverflowPolicy::Drop);
                }
                pool.release(buffer);

                for queue in queues.iter_mut() {
                    if let DrainOutcome::Complete(done) = queue.drain_one(&mut sink) {
                        pool.release(done);
                    }
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_pool_recycling, benchmark_fan_out_and_drain);
criterion_main!(benches);
